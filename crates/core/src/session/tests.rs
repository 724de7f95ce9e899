use super::*;
use crate::config::SessionConfig;
use crate::cookie::{CookieJar, MemoryCookieJar};
use crate::error::{ApiError, SessionError};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::testing::{ApiCall, FakeAdminApi, RecordingNavigator, grant};
use crate::token::{MockTokenInspector, TokenStatus};
use crate::types::Admin;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;

const PHONE: &str = "010-1234-5678";
// base64("010-1234-5678")
const ENCODED_PHONE: &str = "MDEwLTEyMzQtNTY3OA==";
const TOKEN_KEY: &str = "admin_access_token";

struct Harness {
    manager: SessionManager,
    api: Rc<FakeAdminApi>,
    storage: Rc<MemoryStore>,
    jar: Rc<MemoryCookieJar>,
    navigator: Rc<RecordingNavigator>,
}

impl Harness {
    fn new() -> Self {
        Self::with(SessionConfig::default(), status(true, false), MemoryStore::new())
    }

    fn with(config: SessionConfig, inspected: TokenStatus, storage: MemoryStore) -> Self {
        let api = Rc::new(FakeAdminApi::new());
        let storage = Rc::new(storage);
        let jar = Rc::new(MemoryCookieJar::new());
        let navigator = Rc::new(RecordingNavigator::new());

        let mut inspector = MockTokenInspector::new();
        inspector.expect_inspect().returning(move |_| inspected);

        let manager = SessionManager::builder()
            .config(config)
            .api(api.clone())
            .storage(storage.clone())
            .cookies(jar.clone())
            .inspector(Rc::new(inspector))
            .navigator(navigator.clone())
            .runtime(Rc::new(TokioRuntime))
            .build()
            .unwrap();

        Self {
            manager,
            api,
            storage,
            jar,
            navigator,
        }
    }

    fn with_stored_token(token: &str, inspected: TokenStatus) -> Self {
        Self::with(
            SessionConfig::default(),
            inspected,
            MemoryStore::with_item(TOKEN_KEY, token),
        )
    }

    fn cookie(&self) -> Option<String> {
        self.jar
            .entries()
            .into_iter()
            .find(|cookie| cookie.name == "admin_phone")
            .map(|cookie| cookie.value)
    }

    fn stored_token(&self) -> Option<String> {
        self.storage.get_item(TOKEN_KEY).unwrap()
    }
}

fn status(is_valid: bool, needs_refresh: bool) -> TokenStatus {
    TokenStatus {
        is_valid,
        needs_refresh,
        expires_at: None,
    }
}

fn oksana() -> Admin {
    Admin {
        admin_id: 1,
        name: "Oksana".into(),
        phone: Some(PHONE.into()),
    }
}

async fn local<F: std::future::Future>(test: F) -> F::Output {
    LocalSet::new().run_until(test).await
}

#[tokio::test]
async fn phone_login_stores_token_cookie_and_starts_monitor() {
    local(async {
        let h = Harness::new();
        h.api.push_verify(Ok(grant("abc", 1, "Oksana")));

        let admin = h.manager.verify_phone_and_login(PHONE).await.unwrap();

        assert_eq!(admin, oksana());
        assert_eq!(h.manager.access_token().as_deref(), Some("abc"));
        assert_eq!(h.stored_token().as_deref(), Some("abc"));
        assert_eq!(h.cookie().as_deref(), Some(ENCODED_PHONE));
        assert!(h.manager.state().is_authenticated());
        assert_eq!(h.manager.state().admin(), Some(oksana()));
        assert!(!h.manager.state().is_loading());
        assert!(h.manager.is_monitoring());
    })
    .await;
}

#[tokio::test]
async fn existing_relogin_cookie_is_never_overwritten() {
    local(async {
        let h = Harness::new();
        h.api
            .push_verify(Ok(grant("first", 1, "Oksana")))
            .push_verify(Ok(grant("second", 2, "Taras")));

        h.manager.verify_phone_and_login(PHONE).await.unwrap();
        let admin = h
            .manager
            .verify_phone_and_login("010-9999-0000")
            .await
            .unwrap();

        assert_eq!(admin.name, "Taras");
        assert_eq!(h.manager.access_token().as_deref(), Some("second"));
        assert_eq!(h.cookie().as_deref(), Some(ENCODED_PHONE));
    })
    .await;
}

#[tokio::test]
async fn failed_login_reports_server_message_and_clears_loading() {
    local(async {
        let h = Harness::new();
        h.api
            .push_verify(Err(ApiError::with_status(404, "등록되지 않은 관리자입니다.")));

        let err = h.manager.verify_phone_and_login(PHONE).await.unwrap_err();

        assert_eq!(err.to_string(), "등록되지 않은 관리자입니다.");
        assert!(!h.manager.state().is_loading());
        assert!(!h.manager.state().is_authenticated());
        assert!(!h.manager.is_monitoring());
        assert_eq!(h.cookie(), None);
    })
    .await;
}

#[tokio::test]
async fn concurrent_logouts_clean_up_once() {
    local(async {
        let h = Harness::new();
        h.api.push_verify(Ok(grant("abc", 1, "Oksana")));
        h.manager.verify_phone_and_login(PHONE).await.unwrap();

        futures::join!(h.manager.logout(), h.manager.logout());

        assert_eq!(h.api.count(|call| matches!(call, ApiCall::Logout(_))), 1);
        assert_eq!(h.navigator.visited(), vec!["/".to_string()]);
        assert_eq!(h.manager.access_token(), None);
        assert_eq!(h.stored_token(), None);
        assert_eq!(h.cookie(), None);
        assert!(!h.manager.state().is_authenticated());
        assert_eq!(h.manager.state().admin(), None);
        assert!(!h.manager.is_monitoring());
    })
    .await;
}

#[tokio::test]
async fn logout_sends_token_and_survives_remote_failure() {
    local(async {
        let h = Harness::with_stored_token("stored", status(true, false));
        h.api
            .push_logout(Err(ApiError::transport("connection reset")));

        h.manager.logout().await;

        assert_eq!(
            h.api.calls(),
            vec![ApiCall::Logout(Some("stored".to_string()))]
        );
        assert_eq!(h.stored_token(), None);
        assert_eq!(h.navigator.visited(), vec!["/".to_string()]);
    })
    .await;
}

#[tokio::test]
async fn logout_navigates_under_base_path() {
    local(async {
        let h = Harness::with(
            SessionConfig::production(),
            status(true, false),
            MemoryStore::new(),
        );
        h.manager.logout().await;
        assert_eq!(h.navigator.visited(), vec!["/OksHouse-Admin/".to_string()]);
    })
    .await;
}

#[tokio::test]
async fn refresh_during_logout_short_circuits_without_network() {
    local(async {
        let h = Harness::new();
        h.manager.logout().await;
        let calls_before = h.api.calls().len();

        let err = h.manager.refresh_access_token().await.unwrap_err();

        assert_eq!(err, SessionError::LogoutInProgress);
        assert_eq!(err.to_string(), "Logout in progress.");
        assert_eq!(h.api.calls().len(), calls_before);
    })
    .await;
}

#[tokio::test]
async fn logout_racing_a_refresh_wins() {
    local(async {
        let h = Harness::with_stored_token("stored", status(true, false));
        h.api.push_refresh(Ok(grant("resurrected", 1, "Oksana")));

        let (refreshed, ()) =
            futures::join!(h.manager.refresh_access_token(), h.manager.logout());

        assert_eq!(refreshed.unwrap_err(), SessionError::LogoutInProgress);
        assert_eq!(h.manager.access_token(), None);
        assert!(!h.manager.state().is_authenticated());
    })
    .await;
}

#[tokio::test]
async fn successful_refresh_updates_token_and_keeps_phone() {
    local(async {
        let h = Harness::new();
        h.api
            .push_verify(Ok(grant("abc", 1, "Oksana")))
            .push_refresh(Ok(grant("renewed", 1, "Oksana")));
        h.manager.verify_phone_and_login(PHONE).await.unwrap();

        let admin = h.manager.refresh_access_token().await.unwrap();

        assert_eq!(admin, oksana());
        assert_eq!(h.stored_token().as_deref(), Some("renewed"));
        assert!(h.manager.state().is_authenticated());
    })
    .await;
}

#[tokio::test]
async fn lookup_failure_falls_back_to_phone_relogin() {
    local(async {
        let h = Harness::with_stored_token("expired", status(false, true));
        h.jar
            .write(&format!("admin_phone={ENCODED_PHONE}; path=/"));
        h.api.push_verify(Ok(grant("fresh", 1, "Oksana")));

        let admin = h.manager.get_current_admin_info().await.unwrap();

        assert_eq!(admin, oksana());
        assert_eq!(
            h.api.calls(),
            vec![
                ApiCall::CurrentAdmin("expired".into()),
                ApiCall::Refresh,
                ApiCall::VerifyPhone(PHONE.into()),
            ]
        );
        assert_eq!(h.manager.access_token().as_deref(), Some("fresh"));
        assert!(h.manager.is_monitoring());
    })
    .await;
}

#[tokio::test]
async fn refresh_failure_without_cookie_logs_out_with_original_error() {
    local(async {
        let h = Harness::with_stored_token("expired", status(false, true));
        h.api
            .push_refresh(Err(ApiError::with_status(401, "Refresh token expired")));

        let err = h.manager.refresh_access_token().await.unwrap_err();

        assert_eq!(err.to_string(), "Refresh token expired");
        assert_eq!(h.stored_token(), None);
        assert!(!h.manager.state().is_authenticated());
        assert_eq!(h.navigator.visited(), vec!["/".to_string()]);
        assert!(h.manager.is_logging_out());
        assert_eq!(
            h.api.count(|call| matches!(call, ApiCall::Logout(Some(t)) if t == "expired")),
            1
        );
    })
    .await;
}

#[tokio::test]
async fn corrupt_relogin_cookie_counts_as_missing() {
    local(async {
        let h = Harness::with_stored_token("expired", status(false, true));
        h.jar.write("admin_phone=%%%not-base64; path=/");

        let err = h.manager.refresh_access_token().await.unwrap_err();

        assert!(matches!(err, SessionError::Api(_)));
        assert_eq!(h.cookie(), None);
        assert_eq!(h.api.count(|call| matches!(call, ApiCall::VerifyPhone(_))), 0);
        assert_eq!(h.navigator.visited(), vec!["/".to_string()]);
    })
    .await;
}

#[tokio::test]
async fn silent_relogin_is_bounded() {
    local(async {
        let config = SessionConfig {
            max_relogin_attempts: 1,
            ..SessionConfig::default()
        };
        let h = Harness::with(config, status(true, false), MemoryStore::new());
        h.jar
            .write(&format!("admin_phone={ENCODED_PHONE}; path=/"));

        // Refresh and verification both keep failing
        let err = h.manager.refresh_access_token().await.unwrap_err();
        assert!(matches!(err, SessionError::Api(_)));
        assert!(!h.manager.is_logging_out());

        let err = h.manager.refresh_access_token().await.unwrap_err();
        assert!(matches!(err, SessionError::Api(_)));
        assert_eq!(h.api.count(|call| matches!(call, ApiCall::VerifyPhone(_))), 1);
        assert!(h.manager.is_logging_out());
        assert_eq!(h.manager.access_token(), None);
    })
    .await;
}

#[tokio::test]
async fn working_relogin_keeps_session_alive() {
    local(async {
        let h = Harness::new();
        h.jar
            .write(&format!("admin_phone={ENCODED_PHONE}; path=/"));
        for n in 0..5 {
            h.api
                .push_verify(Ok(grant(&format!("relogin-{n}"), 1, "Oksana")));
        }

        // Every refresh fails but every silent re-login succeeds
        for n in 0..5 {
            let admin = h.manager.refresh_access_token().await.unwrap();
            assert_eq!(admin.admin_id, 1);
            assert_eq!(h.manager.access_token(), Some(format!("relogin-{n}")));
        }

        assert_eq!(h.api.count(|call| matches!(call, ApiCall::VerifyPhone(_))), 5);
        assert!(!h.manager.is_logging_out());
    })
    .await;
}

#[tokio::test]
async fn lookup_without_token_fails_fast() {
    local(async {
        let h = Harness::new();
        let err = h.manager.get_current_admin_info().await.unwrap_err();
        assert_eq!(err, SessionError::NoAccessToken);
        assert!(h.api.calls().is_empty());
    })
    .await;
}

#[tokio::test]
async fn startup_check_uses_stored_token() {
    local(async {
        let h = Harness::with_stored_token("stored", status(true, false));
        h.api.push_current_admin(Ok(Admin {
            admin_id: 1,
            name: "Oksana".into(),
            phone: None,
        }));

        let admin = h.manager.check_auth_status().await.unwrap();

        assert_eq!(admin.admin_id, 1);
        assert_eq!(h.api.calls(), vec![ApiCall::CurrentAdmin("stored".into())]);
        assert!(h.manager.is_monitoring());
        assert!(!h.manager.state().is_loading());
    })
    .await;
}

#[tokio::test]
async fn startup_check_without_token_uses_refresh_credential() {
    local(async {
        let h = Harness::new();
        h.api.push_refresh(Ok(grant("from-cookie", 3, "Mykola")));

        let admin = h.manager.check_auth_status().await.unwrap();

        assert_eq!(admin.name, "Mykola");
        assert_eq!(h.api.calls(), vec![ApiCall::Refresh]);
        assert_eq!(h.stored_token().as_deref(), Some("from-cookie"));
    })
    .await;
}

#[tokio::test]
async fn startup_check_panic_forces_logout() {
    local(async {
        let h = Harness::with_stored_token("stored", status(true, false));
        h.api.panic_on_lookup();

        let err = h.manager.check_auth_status().await.unwrap_err();

        assert!(matches!(err, SessionError::Unexpected(ref msg) if msg.contains("exploded")));
        assert_eq!(h.stored_token(), None);
        assert_eq!(h.navigator.visited(), vec!["/".to_string()]);
        assert!(!h.manager.state().is_loading());
        assert!(!h.manager.is_monitoring());
    })
    .await;
}

#[tokio::test]
async fn login_after_logout_clears_the_flag() {
    local(async {
        let h = Harness::new();
        h.manager.logout().await;
        assert!(!h.manager.start_monitoring());

        h.api.push_verify(Ok(grant("abc", 1, "Oksana")));
        h.manager.verify_phone_and_login(PHONE).await.unwrap();

        assert!(!h.manager.is_logging_out());
        assert!(h.manager.is_monitoring());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn double_start_yields_one_refresh_per_period() {
    local(async {
        let h = Harness::with_stored_token("stored", status(true, true));
        h.api.push_refresh(Ok(grant("renewed", 1, "Oksana")));

        assert!(h.manager.start_monitoring());
        assert!(h.manager.start_monitoring());
        tokio::time::sleep(Duration::from_secs(31)).await;

        assert_eq!(h.api.count(|call| *call == ApiCall::Refresh), 1);
        assert_eq!(h.manager.access_token().as_deref(), Some("renewed"));
        assert!(h.manager.is_monitoring());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn fresh_token_is_left_alone_by_the_monitor() {
    local(async {
        let h = Harness::with_stored_token("stored", status(true, false));
        h.manager.start_monitoring();
        tokio::time::sleep(Duration::from_secs(95)).await;

        assert!(h.api.calls().is_empty());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn failed_background_refresh_stops_the_monitor() {
    local(async {
        let h = Harness::with_stored_token("stored", status(true, true));
        h.manager.start_monitoring();

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(!h.manager.is_monitoring());
        assert_eq!(h.navigator.visited(), vec!["/".to_string()]);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(h.api.count(|call| *call == ApiCall::Refresh), 1);
    })
    .await;
}

#[tokio::test]
async fn resume_monitoring_requires_a_valid_stored_token() {
    local(async {
        let valid = Harness::with_stored_token("stored", status(true, false));
        assert!(valid.manager.resume_monitoring());
        valid.manager.dispose();
        assert!(!valid.manager.is_monitoring());

        let expired = Harness::with_stored_token("stored", status(false, true));
        assert!(!expired.manager.resume_monitoring());

        let empty = Harness::new();
        assert!(!empty.manager.resume_monitoring());
    })
    .await;
}

#[tokio::test]
async fn fresh_token_is_handed_out_as_is() {
    local(async {
        let h = Harness::with_stored_token("stored", status(true, false));
        assert_eq!(h.manager.ensure_fresh_token().await.as_deref(), Some("stored"));
        assert!(h.api.calls().is_empty());
    })
    .await;
}

#[tokio::test]
async fn expiring_token_is_refreshed_before_use() {
    local(async {
        let h = Harness::with_stored_token("stored", status(true, true));
        h.api.push_refresh(Ok(grant("renewed", 1, "Oksana")));
        assert_eq!(
            h.manager.ensure_fresh_token().await.as_deref(),
            Some("renewed")
        );
    })
    .await;
}

#[tokio::test]
async fn unauthorized_recovery_reports_refresh_outcome() {
    local(async {
        let h = Harness::with_stored_token("stored", status(true, false));
        h.api.push_refresh(Ok(grant("renewed", 1, "Oksana")));
        assert!(h.manager.recover_from_unauthorized().await);
        assert!(!h.manager.recover_from_unauthorized().await);
        assert!(h.manager.is_logging_out());
    })
    .await;
}

#[test]
fn builder_requires_api() {
    let result = SessionManager::builder().build();
    assert!(matches!(result, Err(SessionError::Configuration(_))));
}
