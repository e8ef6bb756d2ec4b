use std::collections::BTreeMap;

use ai_info_core::card::{decode_terms, encode_terms, Localization};
use ai_info_core::{Card, Language, Slot, SLOT_COUNT};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::Database;

pub async fn find_card(db: &Database, date: &str) -> Result<Option<Card>, sqlx::Error> {
    let card_row =
        sqlx::query(r#"SELECT "date", "created_at" FROM "ai_info_cards" WHERE "date" = ?"#)
            .bind(date)
            .fetch_optional(db.pool())
            .await?;

    let Some(card_row) = card_row else {
        return Ok(None);
    };

    let slot_rows = sqlx::query(
        r#"SELECT "date", "slot_index", "category" FROM "ai_info_slots" WHERE "date" = ?"#,
    )
    .bind(date)
    .fetch_all(db.pool())
    .await?;

    let localization_rows = sqlx::query(
        r#"
        SELECT "date", "slot_index", "language", "title", "content", "terms"
        FROM "ai_info_localizations"
        WHERE "date" = ?
        "#,
    )
    .bind(date)
    .fetch_all(db.pool())
    .await?;

    let mut cards = assemble(&[card_row], &slot_rows, &localization_rows);
    Ok(cards.pop())
}

/// Every stored card, oldest date first.
pub async fn list_cards(db: &Database) -> Result<Vec<Card>, sqlx::Error> {
    let card_rows =
        sqlx::query(r#"SELECT "date", "created_at" FROM "ai_info_cards" ORDER BY "date""#)
            .fetch_all(db.pool())
            .await?;

    let slot_rows = sqlx::query(r#"SELECT "date", "slot_index", "category" FROM "ai_info_slots""#)
        .fetch_all(db.pool())
        .await?;

    let localization_rows = sqlx::query(
        r#"
        SELECT "date", "slot_index", "language", "title", "content", "terms"
        FROM "ai_info_localizations"
        "#,
    )
    .fetch_all(db.pool())
    .await?;

    Ok(assemble(&card_rows, &slot_rows, &localization_rows))
}

pub async fn list_dates(db: &Database) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT "date" FROM "ai_info_cards" ORDER BY "date""#)
        .fetch_all(db.pool())
        .await
}

pub async fn count_cards(db: &Database) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT COUNT(*) FROM "ai_info_cards""#)
        .fetch_one(db.pool())
        .await
}

/// Writes the whole card in one transaction, replacing any stored slots.
pub async fn save_card(db: &Database, card: &Card) -> Result<(), sqlx::Error> {
    let mut tx = db.pool().begin().await?;

    sqlx::query(
        r#"
        INSERT INTO "ai_info_cards" ("date") VALUES (?)
        ON CONFLICT ("date") DO UPDATE SET
            "updated_at" = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(&card.date)
    .execute(&mut *tx)
    .await?;

    sqlx::query(r#"DELETE FROM "ai_info_slots" WHERE "date" = ?"#)
        .bind(&card.date)
        .execute(&mut *tx)
        .await?;

    for (index, slot) in card.slots.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO "ai_info_slots" ("date", "slot_index", "category") VALUES (?, ?, ?)"#,
        )
        .bind(&card.date)
        .bind(index as i64)
        .bind(&slot.category)
        .execute(&mut *tx)
        .await?;

        for (language, localization) in slot.localizations() {
            if localization.is_empty() {
                continue;
            }
            sqlx::query(
                r#"
                INSERT INTO "ai_info_localizations"
                    ("date", "slot_index", "language", "title", "content", "terms")
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&card.date)
            .bind(index as i64)
            .bind(language.code())
            .bind(&localization.title)
            .bind(&localization.content)
            .bind(encode_terms(&localization.terms))
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await
}

/// Returns `false` when no card exists for `date`.
pub async fn delete_card(db: &Database, date: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM "ai_info_cards" WHERE "date" = ?"#)
        .bind(date)
        .execute(db.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns `false` when the slot row does not exist.
pub async fn update_slot_category(
    db: &Database,
    date: &str,
    slot_index: usize,
    category: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE "ai_info_slots" SET "category" = ? WHERE "date" = ? AND "slot_index" = ?"#,
    )
    .bind(category)
    .bind(date)
    .bind(slot_index as i64)
    .execute(db.pool())
    .await?;
    Ok(result.rows_affected() > 0)
}

fn assemble(
    card_rows: &[SqliteRow],
    slot_rows: &[SqliteRow],
    localization_rows: &[SqliteRow],
) -> Vec<Card> {
    let mut cards: BTreeMap<String, Card> = BTreeMap::new();

    for row in card_rows {
        let date: String = row.try_get("date").unwrap_or_default();
        let mut card = Card::new(date.clone());
        card.created_at = row.try_get("created_at").ok();
        cards.insert(date, card);
    }

    for row in slot_rows {
        let Some(slot) = slot_for(&mut cards, row) else {
            continue;
        };
        slot.category = row.try_get("category").unwrap_or_default();
    }

    for row in localization_rows {
        let language = row
            .try_get::<String, _>("language")
            .ok()
            .and_then(|code| Language::parse(&code));
        let Some(language) = language else {
            tracing::warn!("skipping localization row with unknown language");
            continue;
        };
        let Some(slot) = slot_for(&mut cards, row) else {
            continue;
        };

        let raw_terms: String = row.try_get("terms").unwrap_or_default();
        *slot.localization_mut(language) = Localization::new(
            row.try_get::<String, _>("title").unwrap_or_default(),
            row.try_get::<String, _>("content").unwrap_or_default(),
            decode_terms(&raw_terms),
        );
    }

    cards.into_values().collect()
}

fn slot_for<'a>(
    cards: &'a mut BTreeMap<String, Card>,
    row: &SqliteRow,
) -> Option<&'a mut Slot> {
    let date: String = row.try_get("date").ok()?;
    let index: i64 = row.try_get("slot_index").ok()?;
    let index = usize::try_from(index).ok().filter(|i| *i < SLOT_COUNT)?;
    cards.get_mut(&date)?.slot_mut(index)
}
