//! [`Query`] collection related to the multiple [`Playlist`]s.

use common::operations::By;

use crate::read::playlist;
#[cfg(doc)]
use crate::{domain::Playlist, Query};

use super::DatabaseQuery;

/// Queries a page of [`Playlist`]s owned by a user.
pub type List =
    DatabaseQuery<By<playlist::list::Page, playlist::list::Selector>>;

/// Queries a page of [`Playlist`]s owned by a user, marking the ones
/// containing a specific video.
pub type ForVideo = DatabaseQuery<
    By<playlist::for_video::Page, playlist::for_video::Selector>,
>;

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Delete},
        pagination::Arguments,
        Limit,
    };

    use crate::{
        domain::{playlist, user, video, Playlist},
        fixture,
        infra::{Database as _, Memory},
        read::{
            playlist::{for_video, list},
            Count,
        },
        Query as _, Service,
    };

    use super::{ForVideo, List};

    async fn list(
        svc: &Service<Memory>,
        owner_id: user::Id,
        limit: u8,
        after: Option<list::Cursor>,
    ) -> list::Page {
        svc.execute(List::by(list::Selector {
            arguments: Arguments::new(Limit::new(limit).unwrap(), after),
            filter: list::Filter { owner_id },
        }))
        .await
        .unwrap()
    }

    async fn candidates(
        svc: &Service<Memory>,
        owner_id: user::Id,
        video_id: Option<video::Id>,
    ) -> for_video::Page {
        svc.execute(ForVideo::by(for_video::Selector {
            arguments: Arguments::new(Limit::new(10).unwrap(), None),
            filter: for_video::Filter { owner_id, video_id },
        }))
        .await
        .unwrap()
    }

    /// Returns IDs of the provided [`Playlist`]s in the list order.
    fn ordered(playlists: &[Playlist]) -> Vec<playlist::Id> {
        let mut keys = playlists
            .iter()
            .map(|p| (p.updated_at, p.id))
            .collect::<Vec<_>>();
        keys.sort_by(|a, b| b.cmp(a));
        keys.into_iter().map(|(_, id)| id).collect()
    }

    #[tokio::test]
    async fn follows_cursor_through_whole_list() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let stranger = fixture::user(db).await;

        let mut owned = Vec::new();
        for secs in [10, 20, 20, 20, 30, 40, 50, 60, 70] {
            let at = fixture::at(secs);
            owned.push(fixture::playlist_at(db, owner.id, at).await);
        }
        _ = fixture::playlist_at(db, stranger.id, fixture::at(35)).await;

        let mut listed = Vec::new();
        let mut pages = 0;
        let mut after = None;
        loop {
            let page = list(&svc, owner.id, 3, after).await;
            pages += 1;
            assert!(page.items.len() <= 3);
            listed.extend(page.items.iter().map(|s| s.playlist.id));
            match page.next_cursor {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        assert_eq!(pages, 3);
        assert_eq!(listed, ordered(&owned));
    }

    #[tokio::test]
    async fn survives_deletion_between_pages() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;

        let mut owned = Vec::new();
        for secs in 1..=8 {
            let at = fixture::at(secs);
            owned.push(fixture::playlist_at(db, owner.id, at).await);
        }
        let expected = ordered(&owned);

        let first = list(&svc, owner.id, 3, None).await;
        assert_eq!(first.items.len(), 3);
        let cursor = first.next_cursor.unwrap();

        // One row of the next page, and the row the cursor points to.
        for id in [expected[4], expected[2]] {
            _ = db
                .execute(Delete(By::<Option<Playlist>, _>::new(id)))
                .await
                .unwrap()
                .unwrap();
        }

        let second = list(&svc, owner.id, 10, Some(cursor)).await;
        let rest = second
            .items
            .iter()
            .map(|s| s.playlist.id)
            .collect::<Vec<_>>();

        assert_eq!(rest, [expected[3], expected[5], expected[6], expected[7]]);
        assert!(second.next_cursor.is_none());
    }

    #[tokio::test]
    async fn ends_on_exactly_full_page() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        for secs in 1..=4 {
            _ = fixture::playlist_at(db, owner.id, fixture::at(secs)).await;
        }

        let page = list(&svc, owner.id, 4, None).await;
        assert_eq!(page.items.len(), 4);
        assert!(page.next_cursor.is_none());

        let empty = list(&svc, fixture::user(db).await.id, 4, None).await;
        assert!(empty.items.is_empty());
        assert!(empty.next_cursor.is_none());
    }

    #[tokio::test]
    async fn summarizes_videos_of_playlist() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let older = fixture::video(
            db,
            owner.id,
            video::Visibility::Public,
            fixture::at(500),
        )
        .await;
        let newer = fixture::video(
            db,
            owner.id,
            video::Visibility::Public,
            fixture::at(100),
        )
        .await;

        let filled = fixture::playlist_at(db, owner.id, fixture::at(2)).await;
        let empty = fixture::playlist_at(db, owner.id, fixture::at(1)).await;
        fixture::add_at(db, filled.id, older.id, fixture::at(10)).await;
        fixture::add_at(db, filled.id, newer.id, fixture::at(20)).await;

        let page = list(&svc, owner.id, 10, None).await;

        assert_eq!(page.items.len(), 2);
        let (summary, blank) = (&page.items[0], &page.items[1]);
        assert_eq!(summary.playlist.id, filled.id);
        assert_eq!(summary.owner.id, owner.id);
        assert_eq!(summary.video_count, Count::from(2));
        assert_eq!(summary.thumbnail_url, newer.thumbnail_url);

        assert_eq!(blank.playlist.id, empty.id);
        assert_eq!(blank.video_count, Count::from(0));
        assert_eq!(blank.thumbnail_url, None);
    }

    #[tokio::test]
    async fn marks_playlists_containing_video() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let video = fixture::public_video(db, owner.id).await;
        let with = fixture::playlist_at(db, owner.id, fixture::at(2)).await;
        let without = fixture::playlist_at(db, owner.id, fixture::at(1)).await;
        fixture::add(db, with.id, video.id).await;

        let page = candidates(&svc, owner.id, Some(video.id)).await;
        let marks = page
            .items
            .iter()
            .map(|c| (c.playlist.id, c.contains_video, c.video_count))
            .collect::<Vec<_>>();
        assert_eq!(
            marks,
            [
                (with.id, true, Count::from(1)),
                (without.id, false, Count::from(0)),
            ],
        );

        let page = candidates(&svc, owner.id, None).await;
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|c| !c.contains_video));
    }

    #[tokio::test]
    async fn fails_whole_page_on_unavailable_storage() {
        let svc = fixture::service();
        let owner = fixture::user(svc.database()).await;
        _ = fixture::playlist(svc.database(), owner.id).await;
        svc.database().set_unavailable(true);

        let err = svc
            .execute(List::by(list::Selector {
                arguments: Arguments::new(Limit::new(10).unwrap(), None),
                filter: list::Filter { owner_id: owner.id },
            }))
            .await
            .unwrap_err();

        assert!(err.as_ref().is_transient(), "{err}");
    }
}
