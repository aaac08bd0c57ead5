//! Which screen is showing.
//!
//! The signed-in state comes from the auth provider's session rather than a
//! separate flag, and authenticated routes can't be reached without one.

use crate::backend::AuthProvider;
use crate::model::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Events,
    Favorites,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Events => "Events",
            Tab::Favorites => "Favorites",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    SignUp,
    Home(Tab),
}

impl Route {
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Home(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    SignedOut,
    SignedIn(Identity),
}

impl Session {
    /// Read the session off the provider.
    pub fn from_auth(auth: &dyn AuthProvider) -> Self {
        match auth.current_user() {
            Some(identity) => Session::SignedIn(identity),
            None => Session::SignedOut,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::SignedIn(identity) => Some(identity),
            Session::SignedOut => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    session: Session,
    route: Route,
}

impl Navigator {
    /// Start on the events tab when a session already exists, otherwise on login.
    pub fn new(session: Session) -> Self {
        let route = if session.is_signed_in() {
            Route::Home(Tab::default())
        } else {
            Route::Login
        };
        Navigator { session, route }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Move to `route`. Returns `false` (and stays put) for an authenticated
    /// route without a session, or an auth route with one.
    pub fn navigate(&mut self, route: Route) -> bool {
        if route.requires_session() != self.session.is_signed_in() {
            tracing::debug!(?route, "navigation refused");
            return false;
        }
        self.route = route;
        true
    }

    pub fn sign_in(&mut self, identity: Identity) {
        tracing::debug!(uid = %identity.uid, "session started");
        self.session = Session::SignedIn(identity);
        self.route = Route::Home(Tab::default());
    }

    pub fn sign_out(&mut self) {
        tracing::debug!("session ended");
        self.session = Session::SignedOut;
        self.route = Route::Login;
    }

    pub fn select_tab(&mut self, tab: Tab) -> bool {
        self.navigate(Route::Home(tab))
    }

    /// Re-read the provider's session, e.g. after an operation that may have
    /// ended it behind our back.
    pub fn sync(&mut self, auth: &dyn AuthProvider) {
        match (Session::from_auth(auth), self.session.is_signed_in()) {
            (Session::SignedIn(identity), false) => self.sign_in(identity),
            (Session::SignedOut, true) => self.sign_out(),
            (Session::SignedIn(identity), true) => self.session = Session::SignedIn(identity),
            (Session::SignedOut, false) => {}
        }
    }
}
