//! Session context and provider

use futures::FutureExt;
use futures::future::{AbortHandle, Abortable, select_all};
use okshouse_admin_core::{Admin, SessionManager, SessionSnapshot};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Session handle plus the latest observed values
#[derive(Clone, PartialEq)]
pub struct SessionContext {
    pub manager: SessionManager,
    pub snapshot: SessionSnapshot,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.snapshot.is_authenticated
    }

    pub fn admin(&self) -> Option<&Admin> {
        self.snapshot.admin.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.is_loading
    }
}

/// Session provider props
#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub manager: SessionManager,
    pub children: Children,
}

/// Re-renders its children whenever a session value changes
#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let snapshot = use_state(|| props.manager.state().snapshot());

    {
        let snapshot = snapshot.clone();
        use_effect_with(props.manager.clone(), move |manager| {
            let state = manager.state();
            let mut authenticated = state.subscribe_authenticated();
            let mut admin = state.subscribe_admin();
            let mut token = state.subscribe_access_token();
            let mut loading = state.subscribe_loading();

            let manager = manager.clone();
            let (abort, registration) = AbortHandle::new_pair();
            let watcher = async move {
                snapshot.set(manager.state().snapshot());
                loop {
                    let (changed, _, _) = select_all([
                        authenticated.changed().boxed_local(),
                        admin.changed().boxed_local(),
                        token.changed().boxed_local(),
                        loading.changed().boxed_local(),
                    ])
                    .await;
                    // Senders live as long as the manager
                    if changed.is_err() {
                        break;
                    }
                    snapshot.set(manager.state().snapshot());
                }
            };
            spawn_local(async move {
                let _ = Abortable::new(watcher, registration).await;
            });

            move || abort.abort()
        });
    }

    let context = SessionContext {
        manager: props.manager.clone(),
        snapshot: (*snapshot).clone(),
    };

    html! {
        <ContextProvider<SessionContext> context={context}>
            {props.children.clone()}
        </ContextProvider<SessionContext>>
    }
}

/// Hook to use the session context
#[hook]
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
        .expect("SessionContext not found. Make sure to wrap your component with SessionProvider")
}

#[hook]
pub fn use_is_authenticated() -> bool {
    use_session().is_authenticated()
}

/// Hook to get the signed-in admin
#[hook]
pub fn use_current_admin() -> Option<Admin> {
    use_session().admin().cloned()
}
