//! [`Query`] collection related to the multiple [`Video`]s.

use common::operations::By;

use crate::read::video;
#[cfg(doc)]
use crate::{domain::Video, Query};

use super::DatabaseQuery;

/// Queries a page of public [`Video`]s in a playlist.
pub type InPlaylist =
    DatabaseQuery<By<video::in_playlist::Page, video::in_playlist::Selector>>;

/// Queries a page of public [`Video`]s watched by a user, most recently
/// watched first.
pub type History =
    DatabaseQuery<By<video::history::Page, video::history::Selector>>;

/// Queries a page of public [`Video`]s liked by a user, most recently liked
/// first.
pub type Liked = DatabaseQuery<By<video::liked::Page, video::liked::Selector>>;

#[cfg(test)]
mod spec {
    use common::{pagination::Arguments, Limit};

    use crate::{
        domain::video::{reaction, Visibility},
        fixture,
        read::{
            video::{history, in_playlist, liked, Stats},
            Count,
        },
        Query as _,
    };

    use super::{History, InPlaylist, Liked};

    fn arguments<C>(limit: u8, after: Option<C>) -> Arguments<C> {
        Arguments::new(Limit::new(limit).unwrap(), after)
    }

    #[tokio::test]
    async fn lists_public_playlist_videos_by_their_modification() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let playlist = fixture::playlist(db, owner.id).await;

        let mut public = Vec::new();
        for secs in [30, 10, 20] {
            let at = fixture::at(secs);
            let video =
                fixture::video(db, owner.id, Visibility::Public, at).await;
            fixture::add(db, playlist.id, video.id).await;
            public.push(video.id);
        }
        let hidden =
            fixture::video(db, owner.id, Visibility::Private, fixture::at(40))
                .await;
        fixture::add(db, playlist.id, hidden.id).await;
        let outside = fixture::public_video(db, owner.id).await;

        let first = svc
            .execute(InPlaylist::by(in_playlist::Selector {
                arguments: arguments(2, None),
                filter: in_playlist::Filter {
                    playlist_id: playlist.id,
                },
            }))
            .await
            .unwrap();
        let second = svc
            .execute(InPlaylist::by(in_playlist::Selector {
                arguments: arguments(2, first.next_cursor),
                filter: in_playlist::Filter {
                    playlist_id: playlist.id,
                },
            }))
            .await
            .unwrap();

        let listed = first
            .items
            .iter()
            .chain(&second.items)
            .map(|c| c.video.id)
            .collect::<Vec<_>>();
        assert_eq!(listed, [public[0], public[2], public[1]]);
        assert!(!listed.contains(&hidden.id));
        assert!(!listed.contains(&outside.id));
        assert!(second.next_cursor.is_none());
    }

    #[tokio::test]
    async fn orders_history_by_last_view() {
        let svc = fixture::service();
        let db = svc.database();
        let author = fixture::user(db).await;
        let viewer = fixture::user(db).await;
        let other = fixture::user(db).await;

        let early =
            fixture::video(db, author.id, Visibility::Public, fixture::at(1))
                .await;
        let late =
            fixture::video(db, author.id, Visibility::Public, fixture::at(2))
                .await;
        let hidden =
            fixture::video(db, author.id, Visibility::Private, fixture::at(3))
                .await;

        fixture::view(db, viewer.id, late.id, fixture::at(100)).await;
        fixture::view(db, viewer.id, early.id, fixture::at(200)).await;
        fixture::view(db, viewer.id, hidden.id, fixture::at(300)).await;
        fixture::view(db, other.id, late.id, fixture::at(400)).await;

        let page = svc
            .execute(History::by(history::Selector {
                arguments: arguments(10, None),
                filter: history::Filter {
                    viewer_id: viewer.id,
                },
            }))
            .await
            .unwrap();

        let watched = page
            .items
            .iter()
            .map(|n| (n.card.video.id, n.viewed_at))
            .collect::<Vec<_>>();
        assert_eq!(
            watched,
            [
                (early.id, fixture::at(200).coerce()),
                (late.id, fixture::at(100).coerce()),
            ],
        );
        assert_eq!(page.items[1].card.stats.views, Count::from(2));
        assert_eq!(page.items[1].card.author.id, author.id);
    }

    #[tokio::test]
    async fn counts_reactions_of_liked_videos() {
        let svc = fixture::service();
        let db = svc.database();
        let author = fixture::user(db).await;
        let me = fixture::user(db).await;
        let video = fixture::public_video(db, author.id).await;
        let disliked = fixture::public_video(db, author.id).await;

        let like = reaction::Kind::Like;
        fixture::react(db, me.id, video.id, like, fixture::at(9)).await;
        fixture::react(
            db,
            me.id,
            disliked.id,
            reaction::Kind::Dislike,
            fixture::at(10),
        )
        .await;
        for _ in 0..2 {
            let fan = fixture::user(db).await;
            fixture::react(db, fan.id, video.id, like, fixture::at(1)).await;
        }
        for _ in 0..3 {
            let hater = fixture::user(db).await;
            fixture::react(
                db,
                hater.id,
                video.id,
                reaction::Kind::Dislike,
                fixture::at(1),
            )
            .await;
            fixture::view(db, hater.id, video.id, fixture::at(1)).await;
        }

        let page = svc
            .execute(Liked::by(liked::Selector {
                arguments: arguments(10, None),
                filter: liked::Filter { user_id: me.id },
            }))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        let node = &page.items[0];
        assert_eq!(node.card.video.id, video.id);
        assert_eq!(node.liked_at, fixture::at(9).coerce());
        assert_eq!(
            node.card.stats,
            Stats {
                views: Count::from(3),
                likes: Count::from(3),
                dislikes: Count::from(3),
            },
        );
    }
}
