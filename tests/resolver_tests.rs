//! Integration tests for the resolver layer
//!
//! Each test builds a schema over a fresh in-memory database and drives it
//! through real GraphQL operations, the same way requests arrive over HTTP.
//! The caller identity is injected as request data, exactly as the transport
//! handler does after verifying a token.

use async_graphql::Request;
use pretty_assertions::assert_eq;
use serde_json::Value;

use bookshelf::db::Database;
use bookshelf::graphql::{build_schema, verify_token, AuthUser, BookshelfSchema};
use bookshelf::services::{gravatar_url, AuthConfig, AuthService};

const JWT_SECRET: &str = "test-secret";

async fn test_schema() -> (BookshelfSchema, Database) {
    let db = Database::connect_in_memory().await.unwrap();
    db.init_schema().await.unwrap();
    let auth = AuthService::new(
        db.clone(),
        AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            // Minimum bcrypt cost keeps hashing fast; production uses DEFAULT_COST
            bcrypt_cost: 4,
        },
    );
    let schema = build_schema(db.clone(), auth);
    (schema, db)
}

async fn exec(schema: &BookshelfSchema, query: &str) -> async_graphql::Response {
    schema.execute(Request::new(query)).await
}

async fn exec_as(
    schema: &BookshelfSchema,
    user: &AuthUser,
    query: &str,
) -> async_graphql::Response {
    schema.execute(Request::new(query).data(user.clone())).await
}

fn data(resp: &async_graphql::Response) -> Value {
    assert!(
        resp.errors.is_empty(),
        "unexpected errors: {:?}",
        resp.errors
    );
    resp.data.clone().into_json().unwrap()
}

fn error_code(resp: &async_graphql::Response) -> String {
    let err = serde_json::to_value(&resp.errors[0]).unwrap();
    err["extensions"]["code"].as_str().unwrap_or("").to_string()
}

/// Sign up a user and return (token, caller identity)
async fn sign_up(
    schema: &BookshelfSchema,
    username: &str,
    email: &str,
    password: &str,
) -> (String, AuthUser) {
    let resp = exec(
        schema,
        &format!(
            r#"mutation {{ signUp(username: "{username}", email: "{email}", password: "{password}") }}"#
        ),
    )
    .await;
    let token = data(&resp)["signUp"].as_str().unwrap().to_string();
    let user = verify_token(&token, JWT_SECRET).unwrap();
    (token, user)
}

async fn add_book(schema: &BookshelfSchema, user: &AuthUser, title: &str) -> String {
    let resp = exec_as(
        schema,
        user,
        &format!(r#"mutation {{ addBook(title: "{title}") {{ id }} }}"#),
    )
    .await;
    data(&resp)["addBook"]["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Sign Up / Sign In
// ============================================================================

#[tokio::test]
async fn sign_up_then_sign_in_yields_token_for_same_user() {
    let (schema, _db) = test_schema().await;
    let (_, created) = sign_up(&schema, "maria", "maria@example.com", "hunter2").await;

    let resp = exec(
        &schema,
        r#"mutation { signIn(username: "maria", password: "hunter2") }"#,
    )
    .await;
    let token = data(&resp)["signIn"].as_str().unwrap().to_string();
    let signed_in = verify_token(&token, JWT_SECRET).unwrap();

    assert_eq!(signed_in.user_id, created.user_id);
}

#[tokio::test]
async fn sign_in_by_email_is_case_and_whitespace_insensitive() {
    let (schema, _db) = test_schema().await;
    let (_, created) = sign_up(&schema, "maria", " Maria@Example.COM ", "hunter2").await;

    let resp = exec(
        &schema,
        r#"mutation { signIn(email: "maria@example.com", password: "hunter2") }"#,
    )
    .await;
    let token = data(&resp)["signIn"].as_str().unwrap().to_string();
    assert_eq!(verify_token(&token, JWT_SECRET).unwrap().user_id, created.user_id);
}

#[tokio::test]
async fn avatar_is_derived_from_normalized_email() {
    let (schema, _db) = test_schema().await;
    let (_, user) = sign_up(&schema, "maria", " Maria@Example.COM ", "hunter2").await;

    let resp = exec_as(&schema, &user, "query { me { email avatar } }").await;
    let me = data(&resp);
    assert_eq!(me["me"]["email"], "maria@example.com");
    assert_eq!(
        me["me"]["avatar"].as_str().unwrap(),
        gravatar_url("maria@example.com")
    );
}

#[tokio::test]
async fn sign_in_failures_share_one_message() {
    let (schema, _db) = test_schema().await;
    sign_up(&schema, "maria", "maria@example.com", "hunter2").await;

    let wrong_password = exec(
        &schema,
        r#"mutation { signIn(username: "maria", password: "nope") }"#,
    )
    .await;
    let unknown_account = exec(
        &schema,
        r#"mutation { signIn(username: "nobody", password: "hunter2") }"#,
    )
    .await;

    assert_eq!(wrong_password.errors[0].message, "Error signing in");
    assert_eq!(unknown_account.errors[0].message, "Error signing in");
    assert_eq!(error_code(&wrong_password), "UNAUTHENTICATED");
    assert_eq!(error_code(&unknown_account), "UNAUTHENTICATED");
}

#[tokio::test]
async fn duplicate_sign_up_fails_with_generic_message() {
    let (schema, _db) = test_schema().await;
    sign_up(&schema, "maria", "maria@example.com", "hunter2").await;

    let dup_username = exec(
        &schema,
        r#"mutation { signUp(username: "maria", email: "other@example.com", password: "x") }"#,
    )
    .await;
    let dup_email = exec(
        &schema,
        r#"mutation { signUp(username: "other", email: "maria@example.com", password: "x") }"#,
    )
    .await;

    assert_eq!(dup_username.errors[0].message, "Error creating account");
    assert_eq!(dup_email.errors[0].message, "Error creating account");
}

// ============================================================================
// Authentication Gating
// ============================================================================

#[tokio::test]
async fn mutations_without_caller_fail_and_write_nothing() {
    let (schema, db) = test_schema().await;
    let (_, author) = sign_up(&schema, "maria", "maria@example.com", "hunter2").await;
    let book_id = add_book(&schema, &author, "Dune").await;

    let attempts = [
        r#"mutation { addBook(title: "Anon") { id } }"#.to_string(),
        format!(r#"mutation {{ updateBook(id: "{book_id}", title: "Hacked") {{ id }} }}"#),
        format!(r#"mutation {{ deleteBook(id: "{book_id}") }}"#),
        format!(r#"mutation {{ toggleFavorite(id: "{book_id}") {{ id }} }}"#),
    ];
    for query in &attempts {
        let resp = exec(&schema, query).await;
        assert_eq!(error_code(&resp), "UNAUTHENTICATED", "query: {query}");
    }

    // No write happened: one book, untouched.
    let books = db.books().list_all().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
    assert_eq!(books[0].favorite_count, 0);
    assert!(books[0].favorited_by.is_empty());
}

#[tokio::test]
async fn invalid_token_is_rejected_not_downgraded() {
    let (schema, _db) = test_schema().await;
    let err = verify_token("tampered.token.value", JWT_SECRET).unwrap_err();
    assert_eq!(err.message, "Session invalid");
}

// ============================================================================
// Authorship Gating
// ============================================================================

#[tokio::test]
async fn update_book_scenario_dune() {
    let (schema, db) = test_schema().await;
    let (_, u1) = sign_up(&schema, "u1", "u1@example.com", "pw1").await;
    let (_, u2) = sign_up(&schema, "u2", "u2@example.com", "pw2").await;

    let resp = exec_as(
        &schema,
        &u1,
        r#"mutation { addBook(title: "Dune") { id title author { id } } }"#,
    )
    .await;
    let added = data(&resp);
    assert_eq!(added["addBook"]["title"], "Dune");
    assert_eq!(added["addBook"]["author"]["id"], u1.user_id.as_str());
    let book_id = added["addBook"]["id"].as_str().unwrap().to_string();

    // Non-author is rejected and nothing changes.
    let forbidden = exec_as(
        &schema,
        &u2,
        &format!(r#"mutation {{ updateBook(id: "{book_id}", title: "Dune Messiah") {{ id }} }}"#),
    )
    .await;
    assert_eq!(error_code(&forbidden), "FORBIDDEN");
    assert_eq!(
        forbidden.errors[0].message,
        "You don't have permission to modify the book"
    );
    let record = db.books().get_by_id(&book_id).await.unwrap().unwrap();
    assert_eq!(record.title, "Dune");

    // The author succeeds.
    let ok = exec_as(
        &schema,
        &u1,
        &format!(r#"mutation {{ updateBook(id: "{book_id}", title: "Dune Messiah") {{ title }} }}"#),
    )
    .await;
    assert_eq!(data(&ok)["updateBook"]["title"], "Dune Messiah");
}

#[tokio::test]
async fn delete_book_scenario() {
    let (schema, db) = test_schema().await;
    let (_, u1) = sign_up(&schema, "u1", "u1@example.com", "pw1").await;
    let (_, u2) = sign_up(&schema, "u2", "u2@example.com", "pw2").await;
    let book_id = add_book(&schema, &u1, "Dune").await;

    let forbidden = exec_as(
        &schema,
        &u2,
        &format!(r#"mutation {{ deleteBook(id: "{book_id}") }}"#),
    )
    .await;
    assert_eq!(error_code(&forbidden), "FORBIDDEN");
    assert!(db.books().get_by_id(&book_id).await.unwrap().is_some());

    let ok = exec_as(
        &schema,
        &u1,
        &format!(r#"mutation {{ deleteBook(id: "{book_id}") }}"#),
    )
    .await;
    assert_eq!(data(&ok)["deleteBook"], true);

    let lookup = exec(&schema, &format!(r#"query {{ book(id: "{book_id}") {{ id }} }}"#)).await;
    assert_eq!(error_code(&lookup), "NOT_FOUND");
}

#[tokio::test]
async fn delete_store_failure_is_reported_as_false() {
    let (schema, db) = test_schema().await;
    let (_, u1) = sign_up(&schema, "u1", "u1@example.com", "pw1").await;
    let book_id = add_book(&schema, &u1, "Dune").await;

    // Make the delete itself fail at the store level, after gating passes.
    sqlx::query(
        "CREATE TRIGGER block_book_delete BEFORE DELETE ON books \
         BEGIN SELECT RAISE(ABORT, 'delete blocked'); END",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let resp = exec_as(
        &schema,
        &u1,
        &format!(r#"mutation {{ deleteBook(id: "{book_id}") }}"#),
    )
    .await;

    // The failure surfaces as `false`, never as an error.
    let result = data(&resp);
    assert_eq!(result["deleteBook"], false);
    assert!(db.books().get_by_id(&book_id).await.unwrap().is_some());
}

#[tokio::test]
async fn missing_book_is_not_found_for_gated_mutations() {
    let (schema, _db) = test_schema().await;
    let (_, u1) = sign_up(&schema, "u1", "u1@example.com", "pw1").await;

    let update = exec_as(
        &schema,
        &u1,
        r#"mutation { updateBook(id: "no-such-id", title: "x") { id } }"#,
    )
    .await;
    let delete = exec_as(
        &schema,
        &u1,
        r#"mutation { deleteBook(id: "no-such-id") }"#,
    )
    .await;
    let toggle = exec_as(
        &schema,
        &u1,
        r#"mutation { toggleFavorite(id: "no-such-id") { id } }"#,
    )
    .await;

    assert_eq!(error_code(&update), "NOT_FOUND");
    assert_eq!(error_code(&delete), "NOT_FOUND");
    assert_eq!(error_code(&toggle), "NOT_FOUND");
}

// ============================================================================
// Favorites
// ============================================================================

#[tokio::test]
async fn toggle_favorite_is_an_involution() {
    let (schema, db) = test_schema().await;
    let (_, author) = sign_up(&schema, "u1", "u1@example.com", "pw1").await;
    let (_, reader) = sign_up(&schema, "u2", "u2@example.com", "pw2").await;
    let book_id = add_book(&schema, &author, "Dune").await;

    let toggle = format!(
        r#"mutation {{ toggleFavorite(id: "{book_id}") {{ favoriteCount favoritedBy {{ id }} }} }}"#
    );

    let on = exec_as(&schema, &reader, &toggle).await;
    let on = data(&on);
    assert_eq!(on["toggleFavorite"]["favoriteCount"], 1);
    assert_eq!(
        on["toggleFavorite"]["favoritedBy"][0]["id"],
        reader.user_id.as_str()
    );

    let off = exec_as(&schema, &reader, &toggle).await;
    let off = data(&off);
    assert_eq!(off["toggleFavorite"]["favoriteCount"], 0);
    assert_eq!(off["toggleFavorite"]["favoritedBy"], serde_json::json!([]));

    // The denormalized count matches the set after every toggle.
    let record = db.books().get_by_id(&book_id).await.unwrap().unwrap();
    assert_eq!(record.favorite_count as usize, record.favorited_by.len());
}

#[tokio::test]
async fn favorite_count_tracks_set_cardinality_across_users() {
    let (schema, db) = test_schema().await;
    let (_, author) = sign_up(&schema, "u1", "u1@example.com", "pw1").await;
    let (_, a) = sign_up(&schema, "a", "a@example.com", "pw").await;
    let (_, b) = sign_up(&schema, "b", "b@example.com", "pw").await;
    let book_id = add_book(&schema, &author, "Dune").await;

    let toggle = format!(r#"mutation {{ toggleFavorite(id: "{book_id}") {{ id }} }}"#);
    exec_as(&schema, &a, &toggle).await;
    exec_as(&schema, &b, &toggle).await;
    exec_as(&schema, &a, &toggle).await; // a un-favorites

    let record = db.books().get_by_id(&book_id).await.unwrap().unwrap();
    assert_eq!(record.favorite_count, 1);
    assert_eq!(record.favorited_by, vec![b.user_id.clone()]);
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn user_query_exposes_books_and_favorites() {
    let (schema, _db) = test_schema().await;
    let (_, u1) = sign_up(&schema, "u1", "u1@example.com", "pw1").await;
    let (_, u2) = sign_up(&schema, "u2", "u2@example.com", "pw2").await;
    let book_id = add_book(&schema, &u1, "Dune").await;
    exec_as(
        &schema,
        &u2,
        &format!(r#"mutation {{ toggleFavorite(id: "{book_id}") {{ id }} }}"#),
    )
    .await;

    let resp = exec(
        &schema,
        r#"query { user(username: "u2") { username favorites { title } books { title } } }"#,
    )
    .await;
    let user = data(&resp);
    assert_eq!(user["user"]["favorites"][0]["title"], "Dune");
    assert_eq!(user["user"]["books"], serde_json::json!([]));

    let missing = exec(&schema, r#"query { user(username: "ghost") { id } }"#).await;
    assert_eq!(error_code(&missing), "NOT_FOUND");
}

#[tokio::test]
async fn me_requires_authentication() {
    let (schema, _db) = test_schema().await;
    let resp = exec(&schema, "query { me { id } }").await;
    assert_eq!(error_code(&resp), "UNAUTHENTICATED");
}

#[tokio::test]
async fn book_feed_pages_newest_first() {
    let (schema, _db) = test_schema().await;
    let (_, u1) = sign_up(&schema, "u1", "u1@example.com", "pw1").await;
    for i in 0..12 {
        add_book(&schema, &u1, &format!("Book {i}")).await;
    }

    let first = exec(&schema, "query { bookFeed { books { id } cursor hasNextPage } }").await;
    let first = data(&first);
    assert_eq!(first["bookFeed"]["books"].as_array().unwrap().len(), 10);
    assert_eq!(first["bookFeed"]["hasNextPage"], true);

    let cursor = first["bookFeed"]["cursor"].as_str().unwrap().to_string();
    let second = exec(
        &schema,
        &format!(r#"query {{ bookFeed(cursor: "{cursor}") {{ books {{ id }} cursor hasNextPage }} }}"#),
    )
    .await;
    let second = data(&second);
    assert_eq!(second["bookFeed"]["books"].as_array().unwrap().len(), 2);
    assert_eq!(second["bookFeed"]["hasNextPage"], false);

    // The two pages partition the twelve books.
    let mut seen: Vec<String> = Vec::new();
    for page in [&first, &second] {
        for book in page["bookFeed"]["books"].as_array().unwrap() {
            seen.push(book["id"].as_str().unwrap().to_string());
        }
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 12);
}

#[tokio::test]
async fn book_feed_rejects_garbage_cursor() {
    let (schema, _db) = test_schema().await;
    let resp = exec(
        &schema,
        r#"query { bookFeed(cursor: "!!not-a-cursor!!") { hasNextPage } }"#,
    )
    .await;
    assert_eq!(resp.errors[0].message, "Invalid cursor");
}

// ============================================================================
// Static Query Limits
// ============================================================================

#[tokio::test]
async fn deeply_nested_queries_are_rejected() {
    let (schema, _db) = test_schema().await;
    // Depth 6: books > author > books > author > books > author
    let resp = exec(
        &schema,
        "query { books { author { books { author { books { author { id } } } } } } }",
    )
    .await;
    assert!(!resp.errors.is_empty());
}
