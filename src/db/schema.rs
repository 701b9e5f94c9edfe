use sqlx::AnyPool;

pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS automation_settings (
  id INTEGER PRIMARY KEY,
  automation_enabled BOOLEAN NOT NULL,
  timezone TEXT NOT NULL,
  target_group_id TEXT,
  target_group_name TEXT,
  daily_post_target BIGINT NOT NULL,
  daily_post_limit BIGINT NOT NULL,
  price_prefix TEXT NOT NULL,
  message_template TEXT NOT NULL,
  last_suggestion_generation_at TIMESTAMP,
  last_scheduler_run_at TIMESTAMP
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS posting_windows (
  id INTEGER PRIMARY KEY,
  start_time TEXT NOT NULL,
  end_time TEXT NOT NULL,
  is_active BOOLEAN NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS themes (
  id INTEGER PRIMARY KEY,
  keyword TEXT NOT NULL UNIQUE,
  is_active BOOLEAN NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS suggestions (
  id INTEGER PRIMARY KEY,
  source_keyword TEXT NOT NULL,
  item_id TEXT NOT NULL,
  shop_id TEXT,
  product_name TEXT NOT NULL,
  image_url TEXT,
  price_min TEXT,
  price_max TEXT,
  formatted_price TEXT,
  product_link TEXT,
  offer_link TEXT,
  short_link TEXT,
  commission_rate DOUBLE PRECISION,
  rating_star DOUBLE PRECISION,
  sales DOUBLE PRECISION,
  score DOUBLE PRECISION NOT NULL,
  status TEXT NOT NULL,
  approved_action TEXT,
  rejection_reason TEXT,
  queue_scheduled_for TIMESTAMP,
  last_error TEXT,
  raw_payload TEXT NOT NULL,
  created_at TIMESTAMP NOT NULL,
  approved_at TIMESTAMP,
  sent_at TIMESTAMP
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS queue_items (
  id INTEGER PRIMARY KEY,
  suggestion_id BIGINT NOT NULL,
  chat_id TEXT NOT NULL,
  scheduled_at TIMESTAMP NOT NULL,
  status TEXT NOT NULL,
  message_text TEXT NOT NULL,
  attempts INTEGER NOT NULL,
  wa_message_id TEXT,
  last_error TEXT,
  sent_at TIMESTAMP
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS post_history (
  id INTEGER PRIMARY KEY,
  suggestion_id BIGINT,
  item_id TEXT NOT NULL,
  shop_id TEXT,
  chat_id TEXT NOT NULL,
  product_name TEXT NOT NULL,
  message_text TEXT NOT NULL,
  short_link TEXT,
  wa_message_id TEXT,
  status TEXT NOT NULL,
  sent_at TIMESTAMP NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_suggestions_status ON suggestions(status);"#)
        .execute(pool)
        .await?;
    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_suggestions_item ON suggestions(item_id, created_at);"#)
        .execute(pool)
        .await?;
    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_queue_items_status ON queue_items(status, scheduled_at);"#)
        .execute(pool)
        .await?;
    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_queue_items_chat ON queue_items(chat_id, scheduled_at);"#)
        .execute(pool)
        .await?;
    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_post_history_chat ON post_history(chat_id, sent_at);"#)
        .execute(pool)
        .await?;
    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_post_history_item ON post_history(item_id, sent_at);"#)
        .execute(pool)
        .await?;

    Ok(())
}
