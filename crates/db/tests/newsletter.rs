//! Newsletter subscription lifecycle and its index filters.

use sqlx::PgPool;

use erasmus_core::listing::{ListOptions, ListParams};
use erasmus_core::newsletter::{generate_token, hash_token};
use erasmus_db::models::newsletter::{NewsletterFilter, NEWSLETTER_SORT};
use erasmus_db::repositories::NewsletterRepo;

fn default_options() -> ListOptions {
    ListOptions::resolve(&ListParams::default(), &NEWSLETTER_SORT).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn subscribe_stores_only_the_token_hash(pool: PgPool) {
    let (plain, hash) = generate_token();
    let sub = NewsletterRepo::subscribe(&pool, "ana@example.org", Some("Ana"), &[], &hash)
        .await
        .unwrap();

    assert!(sub.is_active);
    assert!(!sub.is_verified());
    assert_eq!(sub.verification_token.as_deref(), Some(hash.as_str()));
    assert_ne!(sub.verification_token.as_deref(), Some(plain.as_str()));
}

#[sqlx::test(migrations = "./migrations")]
async fn verify_then_unsubscribe_by_token(pool: PgPool) {
    let (plain, hash) = generate_token();
    NewsletterRepo::subscribe(&pool, "ana@example.org", None, &[], &hash)
        .await
        .unwrap();

    let verified = NewsletterRepo::verify_by_token_hash(&pool, &hash_token(&plain))
        .await
        .unwrap()
        .unwrap();
    assert!(verified.is_verified());

    let gone = NewsletterRepo::unsubscribe_by_token_hash(&pool, &hash_token(&plain))
        .await
        .unwrap()
        .unwrap();
    assert!(!gone.is_active);
    assert!(gone.unsubscribed_at.is_some());

    assert!(NewsletterRepo::verify_by_token_hash(&pool, &hash_token("bogus"))
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn resubscribe_reactivates_existing_row(pool: PgPool) {
    let (_, first) = generate_token();
    let original = NewsletterRepo::subscribe(&pool, "ana@example.org", Some("Ana"), &[], &first)
        .await
        .unwrap();
    NewsletterRepo::unsubscribe_by_token_hash(&pool, &first)
        .await
        .unwrap();

    let (_, second) = generate_token();
    let again = NewsletterRepo::subscribe(
        &pool,
        "ana@example.org",
        None,
        &["KA131".to_string()],
        &second,
    )
    .await
    .unwrap();

    assert_eq!(again.id, original.id);
    assert!(again.is_active);
    assert!(again.unsubscribed_at.is_none());
    assert_eq!(again.name.as_deref(), Some("Ana"));
    assert_eq!(again.programs, vec!["KA131".to_string()]);
}

#[sqlx::test(migrations = "./migrations")]
async fn program_filter_includes_all_program_subscribers(pool: PgPool) {
    let (_, h1) = generate_token();
    let (_, h2) = generate_token();
    let (_, h3) = generate_token();
    NewsletterRepo::subscribe(&pool, "a@example.org", None, &["KA131".to_string()], &h1)
        .await
        .unwrap();
    NewsletterRepo::subscribe(&pool, "b@example.org", None, &["KA121".to_string()], &h2)
        .await
        .unwrap();
    NewsletterRepo::subscribe(&pool, "c@example.org", None, &[], &h3)
        .await
        .unwrap();

    let filter = NewsletterFilter {
        program: Some("ka131".to_string()),
        ..NewsletterFilter::default()
    };
    let page = NewsletterRepo::list(&pool, &filter, &default_options())
        .await
        .unwrap();

    let mut emails: Vec<_> = page.data.iter().map(|s| s.email.as_str()).collect();
    emails.sort_unstable();
    assert_eq!(emails, vec!["a@example.org", "c@example.org"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn verified_filter_and_hard_delete(pool: PgPool) {
    let (plain, hash) = generate_token();
    let (_, other) = generate_token();
    let verified = NewsletterRepo::subscribe(&pool, "a@example.org", None, &[], &hash)
        .await
        .unwrap();
    NewsletterRepo::subscribe(&pool, "b@example.org", None, &[], &other)
        .await
        .unwrap();
    NewsletterRepo::verify_by_token_hash(&pool, &hash_token(&plain))
        .await
        .unwrap();

    let filter = NewsletterFilter {
        verified: Some(true),
        ..NewsletterFilter::default()
    };
    let page = NewsletterRepo::list(&pool, &filter, &default_options())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].id, verified.id);

    assert!(NewsletterRepo::delete(&pool, verified.id).await.unwrap());
    assert!(NewsletterRepo::find_by_id(&pool, verified.id).await.unwrap().is_none());
}
