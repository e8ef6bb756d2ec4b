use ai_info_backend::db::operations::cards;
use ai_info_core::Language;
use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{get, send};

const DATE: &str = "2024-01-15";

fn encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                (b as char).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect()
}

fn slot(title: &str, terms: Value) -> Value {
    json!({
        "title": title,
        "content": format!("{title} 설명"),
        "terms": terms,
    })
}

fn glossary() -> Value {
    json!([
        {"term": "GPU", "description": "그래픽 처리 장치"},
        {"term": "TPU", "description": "텐서 처리 장치"},
        {"term": "LLM", "description": "대규모 언어 모델"},
        {"term": "RAG", "description": "검색 증강 생성"}
    ])
}

fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn indices(items: &Value) -> Vec<u64> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["info_index"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_root() {
    let app = common::create_test_app().await;
    let (status, body) = get(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_health_live_and_info() {
    let app = common::create_test_app().await;

    let (status, body) = get(&app.router, "/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(&app.router, "/api/health/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "ai-info-backend");
    assert_eq!(body["categories"], 8);
}

#[tokio::test]
async fn test_health_without_database() {
    let app = common::create_app_without_db();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "disconnected");

    let (status, _) = get(&app, "/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_storage_endpoints_without_database() {
    let app = common::create_app_without_db();
    let (status, body) = get(&app, &format!("/api/ai-info/{DATE}")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");

    // classification needs no storage
    let (status, body) = get(&app, "/api/ai-info/categories/all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = common::create_test_app().await;
    let (status, body) = get(&app.router, "/api/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_lookup_missing_date_is_empty_list() {
    let app = common::create_test_app().await;
    let (status, body) = get(&app.router, &format!("/api/ai-info/{DATE}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["count"], 0);
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
    assert!(body["data"]["message"].is_string());
}

#[tokio::test]
async fn test_upsert_then_lookup() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({
            "date": DATE,
            "infos": [{
                "title_ko": "GPU 서버 인프라",
                "content_ko": "GPU 서버 인프라 설명",
                "title_en": "GPU server infrastructure",
                "terms_ko": [{"term": "GPU", "description": "그래픽 처리 장치"}]
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["date"], DATE);
    assert_eq!(indices(&body["data"]["infos"]), vec![0]);

    let (status, body) = get(&app.router, &format!("/api/ai-info/{DATE}?language=en")).await;
    assert_eq!(status, StatusCode::OK);
    let item = &body["data"]["items"][0];
    assert_eq!(item["id"], format!("{DATE}_0"));
    assert_eq!(item["title"], "GPU server infrastructure");
    // content falls back to Korean
    assert_eq!(item["content"], "GPU 서버 인프라 설명");
    // terms do not fall back
    assert!(item["terms"].as_array().unwrap().is_empty());
    assert_eq!(item["category"], "AI 하드웨어/인프라");
    assert!(item["subcategory"].is_null());
}

#[tokio::test]
async fn test_upsert_rejects_bad_input() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": "15/01/2024", "infos": [slot("제목", json!([]))]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": DATE, "infos": [{"title": "", "content": ""}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let four: Vec<Value> = (0..4).map(|i| slot(&format!("제목 {i}"), json!([]))).collect();
    let (status, _) = send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": DATE, "infos": four})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fill_then_delete_slot_keeps_other_slots() {
    let app = common::create_test_app().await;

    let first = json!({
        "title_ko": "첫째",
        "content_ko": "첫째 설명",
        "title_en": "First",
        "content_ja": "最初",
        "terms_zh": [{"term": "GPU", "description": "图形处理器"}],
        "category": "AI 응용 서비스"
    });
    send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": DATE, "infos": [first]})),
    )
    .await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({
            "date": DATE,
            "infos": [slot("둘째", json!([])), slot("셋째", json!([]))]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(indices(&body["data"]["infos"]), vec![0, 1, 2]);

    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/api/ai-info/{DATE}/item/0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["card_deleted"], false);

    let (_, body) = get(&app.router, &format!("/api/ai-info/{DATE}")).await;
    assert_eq!(indices(&body["data"]["items"]), vec![1, 2]);
    assert_eq!(body["data"]["items"][0]["title"], "둘째");
    assert_eq!(body["data"]["items"][1]["title"], "셋째");

    let stored = cards::find_card(&app.db, DATE).await.unwrap().unwrap();
    let cleared = stored.slot(0).unwrap();
    for language in Language::ALL {
        assert!(cleared.localization(language).is_empty(), "{language} not cleared");
    }
    assert!(cleared.category.is_empty());
    assert_eq!(stored.slot(1).unwrap().title(Language::Ko), "둘째");

    let rows: i64 = sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM "ai_info_localizations" WHERE "date" = ? AND "slot_index" = 0"#,
    )
    .bind(DATE)
    .fetch_one(app.db.pool())
    .await
    .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn test_deleting_last_slot_removes_card() {
    let app = common::create_test_app().await;

    send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": DATE, "infos": [slot("유일", json!([]))]})),
    )
    .await;

    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/api/ai-info/{DATE}/item/0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["card_deleted"], true);

    let (_, body) = get(&app.router, &format!("/api/ai-info/{DATE}")).await;
    assert_eq!(body["data"]["count"], 0);

    let (_, body) = get(&app.router, "/api/ai-info/total-days").await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn test_delete_slot_rejects_out_of_range_index() {
    let app = common::create_test_app().await;
    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/api/ai-info/{DATE}/item/5"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("'5'"));
}

#[tokio::test]
async fn test_delete_missing_card_is_404() {
    let app = common::create_test_app().await;
    let (status, body) = send(&app.router, "DELETE", &format!("/api/ai-info/{DATE}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(
        &app.router,
        "DELETE",
        &format!("/api/ai-info/{DATE}/item/1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_and_counts() {
    let app = common::create_test_app().await;

    for (date, count) in [("2024-01-14", 1), ("2024-01-15", 2)] {
        let infos: Vec<Value> = (0..count)
            .map(|i| slot(&format!("{date} 항목 {i}"), json!([])))
            .collect();
        send(
            &app.router,
            "POST",
            "/api/ai-info",
            Some(json!({"date": date, "infos": infos})),
        )
        .await;
    }

    let (_, body) = get(&app.router, "/api/ai-info/dates/all").await;
    assert_eq!(body["data"], json!(["2024-01-14", "2024-01-15"]));

    let (_, body) = get(&app.router, "/api/ai-info/all").await;
    let dates: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-15", "2024-01-15", "2024-01-14"]);

    let (_, body) = get(&app.router, "/api/ai-info/total-days").await;
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = get(&app.router, "/api/ai-info/total-count").await;
    assert_eq!(body["data"]["total"], 3);
}

#[tokio::test]
async fn test_terms_total_count() {
    let app = common::create_test_app().await;
    send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": DATE, "infos": [slot("용어", glossary())]})),
    )
    .await;

    let (status, body) = get(&app.router, "/api/ai-info/terms-total-count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_terms"], 4);
    assert_eq!(body["data"]["estimated_total_terms"], 20);
    assert_eq!(body["data"]["total_days"], 1);

    let (_, body) = get(&app.router, "/api/ai-info/all-terms/ko").await;
    assert_eq!(body["data"]["total_terms"], 4);
}

#[tokio::test]
async fn test_categories_and_classification() {
    let app = common::create_test_app().await;

    let (_, body) = get(&app.router, "/api/ai-info/categories/all").await;
    let categories = body["data"].as_array().unwrap();
    assert_eq!(categories.len(), 8);
    assert!(categories.contains(&json!("이미지 생성 AI")));

    let (status, body) = get(
        &app.router,
        &format!("/api/ai-info/categories/{}/subcategories", encode("이미지 생성 AI")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/ai-info/classify",
        Some(json!({"title": "Stable Diffusion", "content": "이미지 생성"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category"], "이미지 생성 AI");
    assert!(body["data"]["suggestions"].as_array().unwrap().len() <= 3);
}

#[tokio::test]
async fn test_category_update_and_filter() {
    let app = common::create_test_app().await;
    send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": DATE, "infos": [slot("GPU 서버 인프라", json!([]))]})),
    )
    .await;

    let hardware = "AI 하드웨어/인프라";
    let (_, body) = get(
        &app.router,
        &format!("/api/ai-info/by-category/{}", encode(hardware)),
    )
    .await;
    assert_eq!(body["data"]["count"], 1);

    let ethics = "AI 윤리/정책";
    let (status, body) = send(
        &app.router,
        "PATCH",
        &format!("/api/ai-info/{DATE}/category/0?category={}", encode(ethics)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category"], ethics);
    assert_eq!(body["data"]["confidence"], 1.0);

    let (_, body) = get(
        &app.router,
        &format!("/api/ai-info/by-category/{}", encode(hardware)),
    )
    .await;
    assert_eq!(body["data"]["count"], 0);
    assert!(body["data"]["message"].is_string());

    let (_, body) = get(&app.router, "/api/ai-info/categories/stats").await;
    assert_eq!(body["data"][ethics]["count"], 1);
    assert_eq!(body["data"][ethics]["dates"], json!([DATE]));

    let (status, _) = send(
        &app.router,
        "PATCH",
        &format!("/api/ai-info/{DATE}/category/0?category=unknown"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        "PATCH",
        &format!("/api/ai-info/{DATE}/category/2?category={}", encode(ethics)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn assert_well_formed(quizzes: &[Value]) {
    for quiz in quizzes {
        let options = quiz["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        let correct = quiz["correct"].as_u64().unwrap() as usize;
        assert!(correct < 4);
        assert!(quiz["explanation"]
            .as_str()
            .unwrap()
            .contains(options[correct].as_str().unwrap()));
    }
}

#[tokio::test]
async fn test_quiz_by_date() {
    let app = common::create_test_app().await;

    let (status, body) = get(&app.router, "/api/ai-info/terms-quiz-by-date/2020-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["quizzes"].as_array().unwrap().is_empty());
    assert!(body["data"]["message"].is_string());

    send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": DATE, "infos": [slot("용어", glossary())]})),
    )
    .await;

    let (status, body) = get(
        &app.router,
        &format!("/api/ai-info/terms-quiz-by-date/{DATE}?count=2"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let quizzes = body["data"]["quizzes"].as_array().unwrap();
    assert_eq!(quizzes.len(), 2);
    assert!(quizzes[0]["question"].as_str().unwrap().ends_with("의 올바른 뜻은?"));
    assert_well_formed(quizzes);

    // Korean-only glossary has no English pool
    let (status, body) = get(
        &app.router,
        &format!("/api/ai-info/terms-quiz-by-date/{DATE}?count=2&language=en"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["quizzes"].as_array().unwrap().is_empty());
    assert!(body["data"]["message"].is_string());
}

#[tokio::test]
async fn test_quiz_by_date_in_english() {
    let app = common::create_test_app().await;

    let bilingual = json!({
        "title_ko": "용어",
        "content_ko": "용어 설명",
        "terms_ko": glossary(),
        "terms_en": [
            {"term": "GPU", "description": "Graphics processing unit"},
            {"term": "TPU", "description": "Tensor processing unit"},
            {"term": "LLM", "description": "Large language model"},
            {"term": "RAG", "description": "Retrieval-augmented generation"}
        ]
    });
    send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": DATE, "infos": [bilingual]})),
    )
    .await;

    let (status, body) = get(
        &app.router,
        &format!("/api/ai-info/terms-quiz-by-date/{DATE}?count=2&language=en"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let quizzes = body["data"]["quizzes"].as_array().unwrap();
    assert_eq!(quizzes.len(), 2);
    for quiz in quizzes {
        assert!(quiz["question"]
            .as_str()
            .unwrap()
            .starts_with("What is the correct meaning of"));
    }
    assert_well_formed(quizzes);
}

#[tokio::test]
async fn test_learning_flow() {
    let app = common::create_test_app().await;
    let date = today();

    send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": date, "infos": [slot("학습", glossary())]})),
    )
    .await;

    let (_, body) = get(&app.router, "/api/ai-info/terms-quiz/s1").await;
    assert!(body["data"]["quizzes"].as_array().unwrap().is_empty());
    assert!(body["data"]["message"].is_string());

    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/api/user-progress/s1/{date}/0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["learned"], json!([0]));

    let (_, body) = get(&app.router, "/api/user-progress/s1").await;
    assert_eq!(body["data"]["learned"][date.as_str()], json!([0]));

    let (_, body) = get(&app.router, "/api/ai-info/learned-terms/s1").await;
    assert_eq!(body["data"]["total_terms"], 4);
    assert_eq!(body["data"]["learned_dates"], json!([date]));

    let (_, body) = get(&app.router, "/api/ai-info/terms-quiz/s1?count=3").await;
    assert_eq!(body["data"]["quizzes"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["total_terms"], 4);

    let (_, body) = get(&app.router, "/api/user-progress/stats/s1").await;
    assert_eq!(body["data"]["total_learned"], 1);
    assert_eq!(body["data"]["total_terms_learned"], 4);
    assert_eq!(body["data"]["streak_days"], 1);
    assert_eq!(body["data"]["max_streak"], 1);
    assert_eq!(body["data"]["total_ai_info_available"], 1);

    // other sessions are unaffected
    let (_, body) = get(&app.router, "/api/user-progress/s2").await;
    assert_eq!(body["data"]["learned"], json!({}));
}

#[tokio::test]
async fn test_term_progress_and_unmark() {
    let app = common::create_test_app().await;
    let date = today();

    send(
        &app.router,
        "POST",
        "/api/ai-info",
        Some(json!({"date": date, "infos": [slot("학습", glossary())]})),
    )
    .await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/user-progress/term-progress/s1",
        Some(json!({"term": "GPU", "date": date, "info_index": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["learned_terms"], json!(["GPU"]));

    let (_, body) = get(&app.router, "/api/ai-info/learned-terms/s1").await;
    assert_eq!(body["data"]["total_terms"], 1);

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/user-progress/term-progress/s1",
        Some(json!({"term": "GPU", "date": date, "info_index": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(&app.router, "POST", &format!("/api/user-progress/s1/{date}/0"), None).await;
    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/api/user-progress/s1/{date}/0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["learned"], json!([]));

    let (status, _) = send(
        &app.router,
        "DELETE",
        &format!("/api/user-progress/s1/{date}/0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        "DELETE",
        &format!("/api/user-progress/s1/{date}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app.router, "/api/user-progress/s1").await;
    assert_eq!(body["data"]["learned_terms"], json!([]));
}

#[tokio::test]
async fn test_reserved_session_ids_cannot_record_progress() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/api/user-progress/stats/{DATE}/0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("'stats'"));

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/user-progress/term-progress/quiz-score",
        Some(json!({"term": "GPU", "date": DATE, "info_index": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/user-progress/quiz-score/stats",
        Some(json!({"score": 1, "total_questions": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&app.router, "/api/user-progress/stats").await;
    assert_eq!(body["data"]["learned"], json!({}));
}

#[tokio::test]
async fn test_quiz_score_and_reset() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/user-progress/quiz-score/s1",
        Some(json!({"score": 3, "total_questions": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quiz_score"], 75);

    let (_, body) = send(
        &app.router,
        "POST",
        "/api/user-progress/quiz-score/s1",
        Some(json!({"score": 1, "totalQuestions": 4})),
    )
    .await;
    assert_eq!(body["data"]["quiz_score"], 25);
    assert_eq!(body["data"]["cumulative_quiz_correct"], 4);
    assert_eq!(body["data"]["cumulative_quiz_total"], 8);
    assert_eq!(body["data"]["cumulative_quiz_score"], 50);

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/user-progress/quiz-score/s1",
        Some(json!({"score": 5, "total_questions": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/user-progress/reset-all-progress/s1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app.router, "/api/user-progress/stats/s1").await;
    assert_eq!(body["data"]["quiz_score"], 0);
    assert_eq!(body["data"]["cumulative_quiz_total"], 0);
}
