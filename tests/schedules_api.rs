mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use sqlx::PgPool;

use common::*;

// 2024-06-09 is a Sunday, 2024-06-10 a Monday, 2024-06-11 a Tuesday.

#[sqlx::test(migrations = "./migrations")]
async fn test_create_single_closing(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    let res = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "closed", "mode": "single", "start_date": "2024-06-11", "moment": "lunch" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    assert_eq!(body["type"], "closed");
    assert_eq!(body["start_date"], "2024-06-11");
    assert_eq!(body["end_date"], serde_json::Value::Null);
    assert_eq!(body["moment"], "lunch");
    assert!(body.get("mode").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_same_day_different_moment_is_still_an_overlap(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    let first = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "closed", "mode": "single", "start_date": "2024-06-11", "moment": "lunch" }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "closed", "mode": "single", "start_date": "2024-06-11", "moment": "dinner" }),
    )
    .await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body = body_json(second).await;
    assert!(body["error"].as_str().unwrap().contains("chevauche"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_range_covering_single_day_is_rejected(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "closed", "mode": "single", "start_date": "2024-06-13", "moment": "dinner" }),
    )
    .await;

    let res = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "closed", "mode": "range", "start_date": "2024-06-11", "end_date": "2024-06-15" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_adjacent_ranges_do_not_overlap(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    let first = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "closed", "mode": "range", "start_date": "2024-06-11", "end_date": "2024-06-12" }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "closed", "mode": "range", "start_date": "2024-06-13", "end_date": "2024-06-15" }),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_range_is_stored_as_full_day(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    let res = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({
            "type": "closed",
            "mode": "range",
            "start_date": "2024-06-11",
            "end_date": "2024-06-14",
            "moment": "lunch"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    assert_eq!(body["moment"], "full_day");
    assert_eq!(body["end_date"], "2024-06-14");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_weekday_rules(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    let open_tuesday = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "open", "mode": "single", "start_date": "2024-06-11", "moment": "full_day" }),
    )
    .await;
    assert_eq!(open_tuesday.status(), StatusCode::BAD_REQUEST);
    let body = body_json(open_tuesday).await;
    assert!(body["fields"]["start_date"].is_array());

    let closed_sunday = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "closed", "mode": "single", "start_date": "2024-06-09", "moment": "lunch" }),
    )
    .await;
    assert_eq!(closed_sunday.status(), StatusCode::BAD_REQUEST);

    let open_monday = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "open", "mode": "single", "start_date": "2024-06-10", "moment": "dinner" }),
    )
    .await;
    assert_eq!(open_monday.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_mode_is_required(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    let res = post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "closed", "start_date": "2024-06-11", "moment": "lunch" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert!(body["fields"]["mode"].is_array());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_patch_does_not_conflict_with_itself(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    let created = body_json(
        post_json_auth(
            &app,
            "/schedules/",
            &token,
            json!({ "type": "closed", "mode": "single", "start_date": "2024-06-11", "moment": "lunch" }),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let res = patch_json_auth(
        &app,
        &format!("/schedules/{id}/"),
        &token,
        json!({ "mode": "single", "moment": "dinner" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["moment"], "dinner");
    assert_eq!(body["start_date"], "2024-06-11");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_patch_into_another_schedule_is_rejected(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    post_json_auth(
        &app,
        "/schedules/",
        &token,
        json!({ "type": "closed", "mode": "single", "start_date": "2024-06-12", "moment": "lunch" }),
    )
    .await;
    let other = body_json(
        post_json_auth(
            &app,
            "/schedules/",
            &token,
            json!({ "type": "closed", "mode": "single", "start_date": "2024-06-14", "moment": "lunch" }),
        )
        .await,
    )
    .await;
    let id = other["id"].as_i64().unwrap();

    let res = patch_json_auth(
        &app,
        &format!("/schedules/{id}/"),
        &token,
        json!({ "mode": "single", "start_date": "2024-06-12" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_put_replaces_schedule(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    let created = body_json(
        post_json_auth(
            &app,
            "/schedules/",
            &token,
            json!({ "type": "closed", "mode": "single", "start_date": "2024-06-11", "moment": "lunch" }),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let res = put_json_auth(
        &app,
        &format!("/schedules/{id}/"),
        &token,
        json!({ "type": "open", "mode": "range", "start_date": "2024-06-16", "end_date": "2024-06-17" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["type"], "open");
    assert_eq!(body["moment"], "full_day");

    let missing = put_json_auth(
        &app,
        "/schedules/999999/",
        &token,
        json!({ "type": "open", "mode": "single", "start_date": "2024-06-16", "moment": "lunch" }),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_get_and_delete(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool).router;

    for start in ["2024-06-14", "2024-06-11"] {
        let res = post_json_auth(
            &app,
            "/schedules/",
            &token,
            json!({ "type": "closed", "mode": "single", "start_date": start, "moment": "full_day" }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let list = body_json(get_auth(&app, "/schedules/", &token).await).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["start_date"], "2024-06-11");
    let id = list[0]["id"].as_i64().unwrap();

    let one = get_auth(&app, &format!("/schedules/{id}/"), &token).await;
    assert_eq!(one.status(), StatusCode::OK);

    let deleted = delete_auth(&app, &format!("/schedules/{id}/"), &token).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = get_auth(&app, &format!("/schedules/{id}/"), &token).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let again = delete_auth(&app, &format!("/schedules/{id}/"), &token).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_schedules_require_staff(pool: PgPool) {
    let waiter = create_user(&pool, "waiter", "waiter@restaurant.test", false).await;
    let waiter_token = access_token_for(&waiter);
    let app = build_test_app(pool).router;

    let anonymous = send(&app, Method::GET, "/schedules/", None, None).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let garbage = get_auth(&app, "/schedules/", "not-a-jwt").await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    let forbidden = get_auth(&app, "/schedules/", &waiter_token).await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_exclusion_violation_answers_as_overlap(pool: PgPool) {
    use axum::response::IntoResponse;
    use restaurant_backoffice::error::AppError;

    let insert = "INSERT INTO exceptional_schedules (schedule_type, start_date, end_date, moment)
                  VALUES ('closed', $1, $2, 'full_day')";
    sqlx::query(insert)
        .bind(chrono::NaiveDate::from_ymd_opt(2024, 6, 11).unwrap())
        .bind(chrono::NaiveDate::from_ymd_opt(2024, 6, 13))
        .execute(&pool)
        .await
        .unwrap();

    // Written straight to the table, so only the constraint can refuse it.
    let err = sqlx::query(insert)
        .bind(chrono::NaiveDate::from_ymd_opt(2024, 6, 12).unwrap())
        .bind(None::<chrono::NaiveDate>)
        .execute(&pool)
        .await
        .unwrap_err();
    let code = err
        .as_database_error()
        .and_then(|e| e.code())
        .map(|c| c.into_owned());
    assert_eq!(code.as_deref(), Some("23P01"));

    let res = AppError::Database(err).into_response();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert!(body["error"].as_str().unwrap().contains("chevauche"));
    assert!(body["fields"]["detail"].is_array());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_creates_keep_one_schedule(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = build_test_app(pool.clone()).router;

    let mut tasks = tokio::task::JoinSet::new();
    for moment in ["lunch", "dinner", "full_day", "lunch", "dinner", "full_day"] {
        let app = app.clone();
        let token = token.clone();
        tasks.spawn(async move {
            let res = post_json_auth(
                &app,
                "/schedules/",
                &token,
                json!({ "type": "closed", "mode": "single", "start_date": "2024-06-11", "moment": moment }),
            )
            .await;
            let status = res.status();
            (status, body_json(res).await)
        });
    }

    let mut created = 0;
    while let Some(joined) = tasks.join_next().await {
        let (status, body) = joined.unwrap();
        match status {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => {
                assert!(body["error"].as_str().unwrap().contains("chevauche"))
            }
            other => panic!("unexpected status {other}: {body}"),
        }
    }
    assert_eq!(created, 1);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exceptional_schedules")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}
