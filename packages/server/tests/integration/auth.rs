use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{BOOTSTRAP_ADMIN, TestApp, routes};

mod validation {
    use super::*;

    #[tokio::test]
    async fn missing_password_is_rejected_before_action_check() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::AUTH, &json!({"action": "sing", "username": "table1"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["error"], "Username and password required");
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::AUTH,
                &json!({"action": "register", "username": "u", "password": "p"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["error"], "Invalid action");
    }

    #[tokio::test]
    async fn malformed_json_gets_error_envelope() {
        let app = TestApp::spawn().await;

        let res = app.send_raw(routes::AUTH, "{not json").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod admin_login {
    use super::*;

    #[tokio::test]
    async fn first_login_sets_password_and_later_logins_check_it() {
        let app = TestApp::spawn().await;
        let login = |password: &str| {
            json!({"action": "admin_login", "username": BOOTSTRAP_ADMIN, "password": password})
        };

        let first = app.post(routes::AUTH, &login("stage-lights")).await;
        assert_eq!(first.status, 200, "bootstrap login failed: {}", first.text);
        assert_eq!(first.body["success"], true);
        assert_eq!(first.body["user"]["username"], BOOTSTRAP_ADMIN);
        assert_eq!(first.body["user"]["role"], "admin");
        assert!(first.body["user"]["id"].is_number());

        let wrong = app.post(routes::AUTH, &login("other-password")).await;
        assert_eq!(wrong.status, 401);
        assert_eq!(wrong.body["code"], "INVALID_CREDENTIALS");

        let again = app.post(routes::AUTH, &login("stage-lights")).await;
        assert_eq!(again.status, 200);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let app = TestApp::spawn().await;
        app.post(
            routes::AUTH,
            &json!({"action": "admin_login", "username": BOOTSTRAP_ADMIN, "password": "right"}),
        )
        .await;

        let unknown = app
            .post(
                routes::AUTH,
                &json!({"action": "admin_login", "username": "ghost", "password": "right"}),
            )
            .await;
        let wrong = app
            .post(
                routes::AUTH,
                &json!({"action": "admin_login", "username": BOOTSTRAP_ADMIN, "password": "nope"}),
            )
            .await;

        assert_eq!(unknown.status, 401);
        assert_eq!(wrong.status, 401);
        assert_eq!(unknown.body, wrong.body);
    }
}

mod table_login {
    use super::*;

    #[tokio::test]
    async fn active_table_logs_in_with_its_password() {
        let app = TestApp::spawn().await;
        let id = app.create_table(5, "table5", "mic-check").await;

        let res = app
            .post(
                routes::AUTH,
                &json!({"action": "table_login", "username": "table5", "password": "mic-check"}),
            )
            .await;

        assert_eq!(res.status, 200, "table login failed: {}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["table"]["id"], id);
        assert_eq!(res.body["table"]["table_number"], 5);
        assert_eq!(res.body["table"]["login"], "table5");
        assert!(res.body["table"]["expires_at"].is_string());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_table(5, "table5", "mic-check").await;

        let res = app
            .post(
                routes::AUTH,
                &json!({"action": "table_login", "username": "table5", "password": "wrong"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn expired_session_is_deactivated_even_though_login_fails() {
        let app = TestApp::spawn().await;
        let id = app
            .insert_table(7, "table7", "pw", Utc::now() - Duration::minutes(1))
            .await;

        let res = app
            .post(
                routes::AUTH,
                &json!({"action": "table_login", "username": "table7", "password": "pw"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "SESSION_EXPIRED");
        assert_eq!(res.body["error"], "Session expired");
        assert!(!app.find_table(id).await.is_active);

        let retry = app
            .post(
                routes::AUTH,
                &json!({"action": "table_login", "username": "table7", "password": "pw"}),
            )
            .await;
        assert_eq!(retry.status, 401);
        assert_eq!(retry.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn deactivated_table_cannot_log_in() {
        let app = TestApp::spawn().await;
        let id = app.create_table(2, "table2", "pw").await;

        let res = app.delete(&format!("{}?id={id}", routes::TABLES)).await;
        assert_eq!(res.status, 200);

        let res = app
            .post(
                routes::AUTH,
                &json!({"action": "table_login", "username": "table2", "password": "pw"}),
            )
            .await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}
