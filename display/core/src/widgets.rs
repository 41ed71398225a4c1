//! Widget Factories
//!
//! Pure `payload -> widget` builders. The dispatcher only decides *which*
//! factory runs and *where* the result goes; the shape of each payload is the
//! factory's business.
//!
//! [`JsonWidgetFactory`] reads the payloads the dialogue backend produces.
//! List payloads are accepted either bare (`[...]`) or wrapped in an object
//! that carries paging hints alongside the items.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classifier::DisplayKind;
use crate::error::WidgetMountError;
use crate::response::DisplayPayload;

/// Default number of books shown per page
pub const DEFAULT_BOOK_PAGE_SIZE: usize = 5;

/// A widget ready to be appended to the conversation log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "kebab-case")]
pub enum Widget {
    /// One location on a map
    LocationMap(LocationMap),
    /// Places near the user
    NearestPlaces(NearestPlaces),
    /// A page of book results
    BookList(BookList),
    /// Description or preview of one book
    BookInfo(BookInfo),
    /// Workout videos
    WorkoutList(WorkoutList),
    /// Past conversations matching a keyword
    KeywordList(KeywordList),
}

impl Widget {
    /// Display kind that produces this widget
    #[must_use]
    pub fn kind(&self) -> DisplayKind {
        match self {
            Widget::LocationMap(_) => DisplayKind::MapSearch,
            Widget::NearestPlaces(_) => DisplayKind::MapFind,
            Widget::BookList(_) => DisplayKind::BookList,
            Widget::BookInfo(_) => DisplayKind::BookDetail,
            Widget::WorkoutList(_) => DisplayKind::WorkoutList,
            Widget::KeywordList(_) => DisplayKind::MemoryKeyword,
        }
    }
}

/// A single map location
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationMap {
    /// Place name
    #[serde(default, alias = "location", alias = "name")]
    pub label: String,
    /// Latitude
    #[serde(alias = "latitude")]
    pub lat: f64,
    /// Longitude
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
    /// Suggested zoom level
    #[serde(default)]
    pub zoom: Option<u8>,
}

/// One result of a nearest-places search
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Place name
    pub name: String,
    /// Latitude
    #[serde(alias = "latitude")]
    pub lat: f64,
    /// Longitude
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
    /// Street address
    #[serde(default)]
    pub address: Option<String>,
    /// Rating, if the provider has one
    #[serde(default)]
    pub rating: Option<f32>,
}

/// Nearest-places results
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NearestPlaces {
    /// What was searched for
    #[serde(default, alias = "searchText", alias = "attraction")]
    pub query: String,
    /// Places, nearest first
    #[serde(default, alias = "results")]
    pub places: Vec<Place>,
}

/// A book record
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Title
    pub title: String,
    /// Authors, in credit order
    #[serde(default)]
    pub authors: Vec<String>,
    /// Publisher's description
    #[serde(default)]
    pub description: Option<String>,
    /// Publication date as given by the catalogue
    #[serde(default)]
    pub published_date: Option<String>,
    /// Average rating
    #[serde(default)]
    pub rating: Option<f32>,
    /// Link to a readable preview
    #[serde(default)]
    pub preview_link: Option<String>,
    /// Link to the catalogue page
    #[serde(default)]
    pub info_link: Option<String>,
}

/// A page of book results
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookList {
    /// Books on this page
    #[serde(default)]
    pub books: Vec<Book>,
    /// Index of the first book on this page within all results
    #[serde(default)]
    pub start_index: usize,
    /// Total matches upstream, when known
    #[serde(default)]
    pub total_results: Option<usize>,
    /// Page size used for "more"/"previous"
    #[serde(default)]
    pub page_size: usize,
}

impl BookList {
    /// Whether a further page exists
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.total_results
            .is_some_and(|total| self.start_index + self.books.len() < total)
    }

    /// Whether an earlier page exists
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.start_index > 0
    }
}

/// Which part of a book to show
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookInfoMode {
    /// Publisher's description
    Description,
    /// Embedded preview link
    Preview,
}

impl BookInfoMode {
    /// Pick the mode from the raw intent text
    #[must_use]
    pub fn from_intent(intent: &str) -> Self {
        if intent.contains("books.preview") {
            BookInfoMode::Preview
        } else {
            BookInfoMode::Description
        }
    }
}

/// Details of one book
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookInfo {
    /// The book
    pub book: Book,
    /// What to show
    pub mode: BookInfoMode,
}

/// A workout video
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    /// Video title
    pub title: String,
    /// Channel that published it
    #[serde(default, alias = "channelTitle")]
    pub channel: Option<String>,
    /// Link to the video
    #[serde(default, alias = "videoUrl", alias = "link")]
    pub url: Option<String>,
    /// Human-readable length
    #[serde(default)]
    pub duration: Option<String>,
}

/// Workout video results
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutList {
    /// Videos in ranking order
    #[serde(default, alias = "videos")]
    pub workouts: Vec<Workout>,
}

/// A remembered comment that contained the keyword
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    /// The matching comment
    #[serde(alias = "comment")]
    pub text: String,
    /// Surrounding turns of that conversation
    #[serde(default)]
    pub context: Vec<String>,
}

/// Keyword search over conversation history
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordList {
    /// The keyword searched for
    #[serde(alias = "word")]
    pub keyword: String,
    /// Matches, newest first
    #[serde(default, alias = "conversationList")]
    pub results: Vec<KeywordMatch>,
}

/// Countdown requested by a timer payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSpec {
    /// Countdown length in seconds
    #[serde(alias = "duration", alias = "durationSeconds")]
    pub seconds: u64,
    /// Optional caption
    #[serde(default)]
    pub label: Option<String>,
}

/// Builds widgets from display payloads
pub trait WidgetFactory {
    /// Countdown for a `Timer` response
    ///
    /// # Errors
    ///
    /// Fails when the payload names no usable duration.
    fn timer(&self, payload: &DisplayPayload) -> Result<TimerSpec, WidgetMountError>;

    /// Single-location map for `MapSearch`
    ///
    /// # Errors
    ///
    /// Fails on a malformed payload.
    fn location_map(&self, payload: &DisplayPayload) -> Result<Widget, WidgetMountError>;

    /// Nearest-places map for `MapFind`
    ///
    /// # Errors
    ///
    /// Fails on a malformed payload.
    fn nearest_places(&self, payload: &DisplayPayload) -> Result<Widget, WidgetMountError>;

    /// Book list for `BookList`
    ///
    /// # Errors
    ///
    /// Fails on a malformed payload.
    fn book_list(&self, payload: &DisplayPayload) -> Result<Widget, WidgetMountError>;

    /// Book description or preview; the intent text picks which
    ///
    /// # Errors
    ///
    /// Fails on a malformed payload.
    fn book_info(&self, payload: &DisplayPayload, intent: &str)
        -> Result<Widget, WidgetMountError>;

    /// Workout videos for `WorkoutList`
    ///
    /// # Errors
    ///
    /// Fails on a malformed payload.
    fn workout_list(&self, payload: &DisplayPayload) -> Result<Widget, WidgetMountError>;

    /// Keyword matches for `MemoryKeyword`
    ///
    /// # Errors
    ///
    /// Fails on a malformed payload.
    fn keyword_list(&self, payload: &DisplayPayload) -> Result<Widget, WidgetMountError>;
}

/// Factory for the backend's JSON payloads
#[derive(Clone, Debug)]
pub struct JsonWidgetFactory {
    book_page_size: usize,
}

impl Default for JsonWidgetFactory {
    fn default() -> Self {
        Self {
            book_page_size: DEFAULT_BOOK_PAGE_SIZE,
        }
    }
}

impl JsonWidgetFactory {
    /// Factory with the default book page size
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Page size to assume when a book list does not state one
    #[must_use]
    pub fn with_book_page_size(mut self, size: usize) -> Self {
        self.book_page_size = size.max(1);
        self
    }
}

fn decode<T: DeserializeOwned>(kind: DisplayKind, value: Value) -> Result<T, WidgetMountError> {
    serde_json::from_value(value).map_err(|source| WidgetMountError::MalformedPayload { kind, source })
}

/// Decode a list payload that may arrive bare or wrapped
fn decode_list<T, W>(
    kind: DisplayKind,
    value: Value,
    wrap: impl FnOnce(Vec<T>) -> W,
) -> Result<W, WidgetMountError>
where
    T: DeserializeOwned,
    W: DeserializeOwned,
{
    match value {
        Value::Array(_) => decode::<Vec<T>>(kind, value).map(wrap),
        Value::Object(_) => decode::<W>(kind, value),
        _ => Err(WidgetMountError::UnsupportedPayload {
            kind,
            expected: "a list or an object",
        }),
    }
}

impl WidgetFactory for JsonWidgetFactory {
    fn timer(&self, payload: &DisplayPayload) -> Result<TimerSpec, WidgetMountError> {
        let spec = match payload.structured() {
            Value::Object(map) => decode::<TimerSpec>(DisplayKind::Timer, Value::Object(map))?,
            other => {
                let seconds = match &other {
                    Value::Number(n) => n.as_u64(),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                };
                TimerSpec {
                    seconds: seconds.ok_or(WidgetMountError::UnsupportedPayload {
                        kind: DisplayKind::Timer,
                        expected: "a number of seconds",
                    })?,
                    label: None,
                }
            }
        };
        if spec.seconds == 0 {
            return Err(WidgetMountError::UnsupportedPayload {
                kind: DisplayKind::Timer,
                expected: "a positive number of seconds",
            });
        }
        Ok(spec)
    }

    fn location_map(&self, payload: &DisplayPayload) -> Result<Widget, WidgetMountError> {
        decode(DisplayKind::MapSearch, payload.structured()).map(Widget::LocationMap)
    }

    fn nearest_places(&self, payload: &DisplayPayload) -> Result<Widget, WidgetMountError> {
        decode_list(DisplayKind::MapFind, payload.structured(), |places| {
            NearestPlaces {
                query: String::new(),
                places,
            }
        })
        .map(Widget::NearestPlaces)
    }

    fn book_list(&self, payload: &DisplayPayload) -> Result<Widget, WidgetMountError> {
        let mut list = decode_list(DisplayKind::BookList, payload.structured(), |books| {
            BookList {
                books,
                ..BookList::default()
            }
        })?;
        if list.page_size == 0 {
            list.page_size = self.book_page_size;
        }
        Ok(Widget::BookList(list))
    }

    fn book_info(
        &self,
        payload: &DisplayPayload,
        intent: &str,
    ) -> Result<Widget, WidgetMountError> {
        let value = match payload.structured() {
            // A one-element list is how the catalogue answers "about this book"
            Value::Array(mut items) if items.len() == 1 => items.remove(0),
            other => other,
        };
        let book = decode::<Book>(DisplayKind::BookDetail, value)?;
        Ok(Widget::BookInfo(BookInfo {
            book,
            mode: BookInfoMode::from_intent(intent),
        }))
    }

    fn workout_list(&self, payload: &DisplayPayload) -> Result<Widget, WidgetMountError> {
        decode_list(DisplayKind::WorkoutList, payload.structured(), |workouts| {
            WorkoutList { workouts }
        })
        .map(Widget::WorkoutList)
    }

    fn keyword_list(&self, payload: &DisplayPayload) -> Result<Widget, WidgetMountError> {
        decode(DisplayKind::MemoryKeyword, payload.structured()).map(Widget::KeywordList)
    }
}
