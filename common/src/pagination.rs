//! Keyset pagination abstractions.
//!
//! Every paginated list is ordered by a single sort value and an identifier,
//! both descending. The [`Keyset`] of the last returned item is the cursor to
//! resume from, so concurrent inserts and deletes never shift the next pages.

#[cfg(feature = "serde")]
use std::{fmt, str::FromStr};

use derive_more::Display;

/// Number of items requested for a single [`Page`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(try_from = "u8")
)]
pub struct Limit(u8);

impl Limit {
    /// Maximum allowed [`Limit`].
    pub const MAX: u8 = 100;

    /// [`Limit`] used when none is requested explicitly.
    pub const DEFAULT: Self = Self(10);

    /// Creates a new [`Limit`] if the provided `limit` is within `1..=100`.
    #[must_use]
    pub fn new(limit: impl TryInto<u8>) -> Option<Self> {
        let limit = limit.try_into().ok()?;
        (1..=Self::MAX).contains(&limit).then_some(Self(limit))
    }

    /// Returns this [`Limit`] as a number of items.
    #[must_use]
    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<u8> for Limit {
    type Error = &'static str;

    fn try_from(limit: u8) -> Result<Self, Self::Error> {
        Self::new(limit).ok_or("`Limit` must be within `1..=100` range")
    }
}

/// Position of an item in a list sorted by `(value DESC, id DESC)`.
///
/// Derived ordering compares `value` first and `id` second, so an item goes
/// after a [`Keyset`] in a list if and only if its own [`Keyset`] is less.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Keyset<V, I> {
    /// Sort value of the item.
    pub value: V,

    /// Unique identifier of the item, breaking ties between equal values.
    pub id: I,
}

impl<V, I> Keyset<V, I> {
    /// Creates a new [`Keyset`] out of the provided sort `value` and `id`.
    #[must_use]
    pub const fn new(value: V, id: I) -> Self {
        Self { value, id }
    }

    /// Checks whether the item positioned at `other` goes strictly after this
    /// [`Keyset`] in a descending list.
    #[must_use]
    pub fn is_followed_by(&self, other: &Self) -> bool
    where
        V: Ord,
        I: Ord,
    {
        other < self
    }
}

/// Pagination arguments.
#[derive(Clone, Copy, Debug)]
pub struct Arguments<C> {
    /// Maximum number of items to return.
    pub limit: Limit,

    /// Cursor after which to return items.
    ///
    /// [`None`] means the list is read from its very beginning.
    pub after: Option<C>,
}

impl<C> Arguments<C> {
    /// Creates new [`Arguments`].
    #[must_use]
    pub const fn new(limit: Limit, after: Option<C>) -> Self {
        Self { limit, after }
    }

    /// Returns the number of items to fetch from a storage in order to detect
    /// whether there is a next [`Page`].
    #[must_use]
    pub fn fetch_limit(&self) -> usize {
        self.limit.get() + 1
    }
}

/// A page of a list.
#[derive(Clone, Debug)]
pub struct Page<C, I> {
    /// Items of this [`Page`] in the list order.
    pub items: Vec<I>,

    /// Cursor to request the next [`Page`] with, if there are more items.
    pub next_cursor: Option<C>,
}

impl<C, I> Page<C, I> {
    /// Creates a new [`Page`] out of the items `fetched` from a storage.
    ///
    /// `fetched` must be already filtered, bounded by the [`Arguments::after`]
    /// cursor and ordered. Only [`Arguments::fetch_limit()`] items of it are
    /// consumed: the extra one just signals that a next [`Page`] exists and is
    /// dropped.
    #[must_use]
    pub fn from_fetched(
        arguments: &Arguments<C>,
        fetched: impl IntoIterator<Item = I>,
        cursor: impl Fn(&I) -> C,
    ) -> Self {
        let limit = arguments.limit.get();

        let mut items = fetched
            .into_iter()
            .take(arguments.fetch_limit())
            .collect::<Vec<_>>();
        let has_more = items.len() > limit;
        items.truncate(limit);

        Self {
            next_cursor: has_more.then(|| items.last().map(cursor)).flatten(),
            items,
        }
    }

    /// Indicates whether there are more items after this [`Page`].
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Pagination selector.
#[derive(Clone, Copy, Debug)]
pub struct Selector<C, F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments<C>,

    /// Filter applied to the list before paginating it.
    pub filter: F,
}

#[cfg(feature = "serde")]
pub mod token {
    //! Opaque [`Keyset`] tokens handed out to API clients.
    //!
    //! A token looks like `<version>.<payload>`, where `payload` is URL-safe
    //! unpadded base64 of a `{"v": <value>, "i": <id>}` JSON object. Tokens of
    //! unknown versions are rejected, so the sort keys may change later
    //! without old tokens being misinterpreted.

    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use derive_more::{Display, Error, From};
    use serde::{de::DeserializeOwned, Deserialize, Serialize};

    use super::Keyset;

    /// Version of the tokens produced by [`encode()`].
    pub const VERSION: &str = "1";

    /// Separator between the version and the payload of a token.
    const SEPARATOR: char = '.';

    /// Borrowed payload of a token being encoded.
    #[derive(Serialize)]
    struct Encoded<'a, V, I> {
        v: &'a V,
        i: &'a I,
    }

    /// Owned payload of a token being decoded.
    #[derive(Deserialize)]
    struct Decoded<V, I> {
        v: V,
        i: I,
    }

    /// Encodes the provided [`Keyset`] into an opaque token.
    ///
    /// # Errors
    ///
    /// If the [`Keyset`] parts fail to serialize.
    pub fn encode<V, I>(
        keyset: &Keyset<V, I>,
    ) -> Result<String, serde_json::Error>
    where
        V: Serialize,
        I: Serialize,
    {
        let json = serde_json::to_vec(&Encoded {
            v: &keyset.value,
            i: &keyset.id,
        })?;
        Ok(format!("{VERSION}{SEPARATOR}{}", URL_SAFE_NO_PAD.encode(json)))
    }

    /// Decodes a [`Keyset`] out of the provided opaque `token`.
    ///
    /// # Errors
    ///
    /// See [`DecodeError`] for details.
    pub fn decode<V, I>(token: &str) -> Result<Keyset<V, I>, DecodeError>
    where
        V: DeserializeOwned,
        I: DeserializeOwned,
    {
        let (version, payload) = token
            .split_once(SEPARATOR)
            .ok_or(DecodeError::Malformed)?;
        if version != VERSION {
            return Err(DecodeError::UnsupportedVersion(version.to_owned()));
        }

        let json = URL_SAFE_NO_PAD.decode(payload)?;
        let Decoded { v, i } = serde_json::from_slice(&json)?;

        Ok(Keyset { value: v, id: i })
    }

    /// Error of decoding a [`Keyset`] token.
    #[derive(Debug, Display, Error, From)]
    pub enum DecodeError {
        /// Token has no version separator.
        #[display("token has no version")]
        Malformed,

        /// Token is of an unknown version.
        #[display("unsupported token version `{_0}`")]
        UnsupportedVersion(#[error(not(source))] String),

        /// Token payload is not a valid base64.
        #[display("invalid token payload encoding: {_0}")]
        #[from]
        Base64(base64::DecodeError),

        /// Token payload doesn't describe a [`Keyset`].
        #[display("invalid token payload: {_0}")]
        #[from]
        Json(serde_json::Error),
    }
}

#[cfg(feature = "serde")]
impl<V, I> Display for Keyset<V, I>
where
    V: serde::Serialize,
    I: serde::Serialize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&token::encode(self).map_err(|_| fmt::Error)?)
    }
}

#[cfg(feature = "serde")]
impl<V, I> FromStr for Keyset<V, I>
where
    V: serde::de::DeserializeOwned,
    I: serde::de::DeserializeOwned,
{
    type Err = token::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        token::decode(s)
    }
}

/// Defines pagination types of a list.
///
/// Expects `Node` and `Filter` types to be defined next to the invocation.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($value:ty, $id:ty) => {
        #[doc = "Cursor pointing to a specific [`Node`] in a list."]
        pub type Cursor = $crate::pagination::Keyset<$value, $id>;

        #[doc = "A [`Page`] of [`Node`]s."]
        pub type Page = $crate::pagination::Page<Cursor, Node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments<Cursor>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<Cursor, Filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Keyset, Limit, Page};

    type Cursor = Keyset<u32, u32>;

    fn arguments(limit: u8, after: Option<Cursor>) -> Arguments<Cursor> {
        Arguments::new(Limit::new(limit).unwrap(), after)
    }

    /// Keysets of a descending list with duplicated sort values.
    fn dataset() -> Vec<Keyset<u32, u32>> {
        let mut items = vec![
            Keyset::new(5, 1),
            Keyset::new(5, 7),
            Keyset::new(3, 2),
            Keyset::new(9, 4),
            Keyset::new(3, 9),
            Keyset::new(1, 3),
            Keyset::new(5, 5),
        ];
        items.sort_by(|a, b| b.cmp(a));
        items
    }

    fn fetch(
        data: &[Keyset<u32, u32>],
        args: &Arguments<Keyset<u32, u32>>,
    ) -> Page<Keyset<u32, u32>, Keyset<u32, u32>> {
        Page::from_fetched(
            args,
            data.iter()
                .copied()
                .filter(|k| args.after.map_or(true, |c| c.is_followed_by(k))),
            |k| *k,
        )
    }

    #[test]
    fn limit_bounds() {
        assert!(Limit::new(0).is_none());
        assert!(Limit::new(-1).is_none());
        assert!(Limit::new(101).is_none());
        assert!(Limit::new(1000).is_none());

        assert_eq!(Limit::new(1).unwrap().get(), 1);
        assert_eq!(Limit::new(100).unwrap().get(), 100);
        assert_eq!(Limit::new(42_i32).unwrap().get(), 42);
    }

    #[test]
    fn keyset_breaks_ties_by_id() {
        let cursor = Keyset::new(5, 5);

        assert!(cursor.is_followed_by(&Keyset::new(5, 1)));
        assert!(cursor.is_followed_by(&Keyset::new(3, 9)));
        assert!(!cursor.is_followed_by(&Keyset::new(5, 5)));
        assert!(!cursor.is_followed_by(&Keyset::new(5, 7)));
        assert!(!cursor.is_followed_by(&Keyset::new(9, 0)));
    }

    #[test]
    fn empty_page_has_no_cursor() {
        let page = fetch(&[], &arguments(10, None));

        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn exact_limit_has_no_next_page() {
        let data = dataset();
        let page = fetch(&data, &arguments(7, None));

        assert_eq!(page.items.len(), 7);
        assert!(!page.has_more());
    }

    #[test]
    fn truncates_extra_item() {
        let data = dataset();
        let page = fetch(&data, &arguments(3, None));

        assert_eq!(
            page.items,
            [Keyset::new(9, 4), Keyset::new(5, 7), Keyset::new(5, 5)],
        );
        assert_eq!(page.next_cursor, Some(Keyset::new(5, 5)));
    }

    #[test]
    fn follows_cursors_till_the_end() {
        let data = dataset();

        for limit in 1..=8 {
            let mut collected = Vec::new();
            let mut after = None;
            loop {
                let page = fetch(&data, &arguments(limit, after));
                assert!(page.items.len() <= usize::from(limit));
                collected.extend(page.items);
                match page.next_cursor {
                    Some(c) => after = Some(c),
                    None => break,
                }
            }

            assert_eq!(collected, data, "limit: {limit}");
        }
    }

    #[test]
    fn survives_deletion_between_pages() {
        let mut data = dataset();
        let first = fetch(&data, &arguments(2, None));
        let cursor = first.next_cursor.unwrap();

        // Remove the cursor row itself and some row after it.
        data.retain(|k| *k != cursor && *k != Keyset::new(3, 2));
        let second = fetch(&data, &arguments(10, Some(cursor)));

        assert_eq!(
            second.items,
            [
                Keyset::new(5, 5),
                Keyset::new(5, 1),
                Keyset::new(3, 9),
                Keyset::new(1, 3),
            ],
        );
        assert!(second.next_cursor.is_none());
    }

    #[cfg(feature = "serde")]
    mod token {
        use uuid::Uuid;

        use super::super::{token, Keyset};

        #[test]
        fn encodes_versioned_token() {
            let id = Uuid::new_v4();
            let keyset = Keyset::new(1_700_000_000_123_456_i64, id);

            let encoded = keyset.to_string();
            assert!(encoded.starts_with("1."), "token: {encoded}");
            assert!(!encoded.contains(&id.to_string()), "token: {encoded}");

            let decoded: Keyset<i64, Uuid> = encoded.parse().unwrap();
            assert_eq!(decoded, keyset);
        }

        #[test]
        fn rejects_foreign_tokens() {
            assert!(matches!(
                "abc".parse::<Keyset<i64, Uuid>>(),
                Err(token::DecodeError::Malformed),
            ));
            assert!(matches!(
                "2.e30".parse::<Keyset<i64, Uuid>>(),
                Err(token::DecodeError::UnsupportedVersion(v)) if v == "2",
            ));
            assert!(matches!(
                "1.***".parse::<Keyset<i64, Uuid>>(),
                Err(token::DecodeError::Base64(_)),
            ));
            assert!(matches!(
                "1.e30".parse::<Keyset<i64, Uuid>>(),
                Err(token::DecodeError::Json(_)),
            ));
        }
    }
}
