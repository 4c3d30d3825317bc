//! Fixtures for testing against a [`Memory`] database.

use common::{
    operations::{By, Insert, Select},
    DateTime, Limit,
};

use crate::{
    domain::{
        playlist::{self, Membership},
        user,
        video::{self, reaction, Reaction, View},
        Playlist, User, Video,
    },
    infra::{Database as _, Memory},
    Config, Service,
};

/// Secret signing test [`Session`] tokens.
///
/// [`Session`]: user::Session
pub(crate) const SECRET: &[u8] = b"test-secret";

/// Returns [`Config`] verifying tokens signed with the [`SECRET`].
pub(crate) fn config() -> Config {
    Config {
        jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(SECRET),
        default_page_size: Limit::new(10).unwrap(),
    }
}

/// Creates a new [`Service`] over an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    Service::new(config(), Memory::new())
}

/// Returns the [`DateTime`] the provided number of seconds after the epoch.
pub(crate) fn at(secs: i64) -> DateTime {
    DateTime::from_unix_timestamp(secs).unwrap()
}

pub(crate) async fn user(db: &Memory) -> User {
    let now = DateTime::now();
    let user = User {
        id: user::Id::new(),
        name: user::Name::new("Jane").unwrap(),
        image_url: "https://img.example.com/jane.png".into(),
        created_at: now.coerce(),
        updated_at: now.coerce(),
    };
    db.execute(Insert(user.clone())).await.unwrap();
    user
}

pub(crate) async fn video(
    db: &Memory,
    owner_id: user::Id,
    visibility: video::Visibility,
    updated_at: DateTime,
) -> Video {
    let video = Video {
        id: video::Id::new(),
        owner_id,
        title: "Untitled".into(),
        description: None,
        thumbnail_url: Some(
            format!("https://img.example.com/{}.jpg", updated_at.unix_micros())
                .into(),
        ),
        visibility,
        created_at: updated_at.coerce(),
        updated_at: updated_at.coerce(),
    };
    db.execute(Insert(video.clone())).await.unwrap();
    video
}

pub(crate) async fn public_video(db: &Memory, owner_id: user::Id) -> Video {
    video(db, owner_id, video::Visibility::Public, DateTime::now()).await
}

pub(crate) async fn playlist_at(
    db: &Memory,
    owner_id: user::Id,
    updated_at: DateTime,
) -> Playlist {
    let playlist = Playlist {
        id: playlist::Id::new(),
        owner_id,
        name: playlist::Name::new("Favourites").unwrap(),
        description: None,
        created_at: updated_at.coerce(),
        updated_at: updated_at.coerce(),
    };
    db.execute(Insert(playlist.clone())).await.unwrap();
    playlist
}

pub(crate) async fn playlist(db: &Memory, owner_id: user::Id) -> Playlist {
    playlist_at(db, owner_id, DateTime::now()).await
}

pub(crate) async fn find_playlist(
    db: &Memory,
    id: playlist::Id,
) -> Option<Playlist> {
    db.execute(Select(By::<Option<Playlist>, _>::new(id)))
        .await
        .unwrap()
}

pub(crate) async fn add_at(
    db: &Memory,
    playlist_id: playlist::Id,
    video_id: video::Id,
    updated_at: DateTime,
) {
    db.execute(Insert(Membership {
        playlist_id,
        video_id,
        created_at: updated_at.coerce(),
        updated_at: updated_at.coerce(),
    }))
    .await
    .unwrap();
}

pub(crate) async fn add(
    db: &Memory,
    playlist_id: playlist::Id,
    video_id: video::Id,
) {
    add_at(db, playlist_id, video_id, DateTime::now()).await;
}

pub(crate) async fn view(
    db: &Memory,
    user_id: user::Id,
    video_id: video::Id,
    updated_at: DateTime,
) {
    db.execute(Insert(View {
        user_id,
        video_id,
        created_at: updated_at.coerce(),
        updated_at: updated_at.coerce(),
    }))
    .await
    .unwrap();
}

pub(crate) async fn react(
    db: &Memory,
    user_id: user::Id,
    video_id: video::Id,
    kind: reaction::Kind,
    updated_at: DateTime,
) {
    db.execute(Insert(Reaction {
        user_id,
        video_id,
        kind,
        created_at: updated_at.coerce(),
        updated_at: updated_at.coerce(),
    }))
    .await
    .unwrap();
}
