//! Two users sharing one in-memory backend, driven through the screens.

use gather_core::auth::SignUpForm;
use gather_core::backend::memory::MemoryBackend;
use gather_core::navigation::{Navigator, Route, Session, Tab};
use gather_core::screens::{EventScreen, FavoritesScreen, LoginScreen, SignUpScreen};

fn sign_up_screen(name: &str, email: &str) -> SignUpScreen {
    SignUpScreen {
        form: SignUpForm {
            name: name.into(),
            email: email.into(),
            password: "secret1".into(),
        },
    }
}

#[tokio::test]
async fn favorite_then_unfavorite_leaves_event_in_place() {
    let memory = MemoryBackend::new();
    let backend = memory.backend();
    let mut nav = Navigator::new(Session::from_auth(backend.auth.as_ref()));
    assert_eq!(nav.route(), Route::Login);

    // User A signs up and creates "Meetup".
    assert!(nav.navigate(Route::SignUp));
    let alice = sign_up_screen("Alice", "alice@example.com")
        .submit(&backend)
        .await
        .unwrap();
    nav.sync(backend.auth.as_ref());
    assert_eq!(nav.route(), Route::Home(Tab::Events));

    let mut events = EventScreen::open(backend.data()).await.unwrap();
    events.form.name = "Meetup".into();
    events.form.venue = "Community Hall".into();
    assert!(events.add_event().await);
    events.log_out().await.unwrap();
    drop(events);
    nav.sync(backend.auth.as_ref());
    assert_eq!(nav.route(), Route::Login);

    // User B signs up, logs out, and logs back in.
    sign_up_screen("Bob", "bob@example.com")
        .submit(&backend)
        .await
        .unwrap();
    backend.auth.sign_out().await.unwrap();
    let bob = LoginScreen {
        email: "bob@example.com".into(),
        password: "secret1".into(),
    }
    .submit(&backend)
    .await
    .unwrap();
    nav.sync(backend.auth.as_ref());
    assert_eq!(nav.session().identity().map(|i| i.uid.as_str()), Some(bob.id.as_str()));

    let mut events = EventScreen::open(backend.data()).await.unwrap();
    let row = events.rows().remove(0);
    assert_eq!(row.event.name, "Meetup");
    assert_eq!(row.event.created_by, alice.id);
    assert!(!row.can_edit);

    events.toggle_favorite(&row.event.id).await;
    assert!(nav.select_tab(Tab::Favorites));
    let mut favorites = FavoritesScreen::open(backend.data()).await.unwrap();
    assert_eq!(favorites.rows().len(), 1);

    favorites.remove(&row.event.id).await;
    assert!(favorites.rows().is_empty());

    let rows = events.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].event.name, "Meetup");
    assert_eq!(rows[0].event.created_by, alice.id);
    assert!(!rows[0].is_favorite);
}

#[tokio::test]
async fn weak_password_never_reaches_provider() {
    let memory = MemoryBackend::new();
    let backend = memory.backend();

    let mut screen = sign_up_screen("Alice", "alice@example.com");
    screen.form.password = "12345".into();
    assert_eq!(screen.submit(&backend).await.unwrap_err().title, "Weak Password");
    assert_eq!(memory.auth.sign_up_requests(), 0);

    screen.form.password = "123456".into();
    assert!(screen.submit(&backend).await.is_ok());
    assert_eq!(memory.auth.sign_up_requests(), 1);
}
