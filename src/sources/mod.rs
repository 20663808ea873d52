//! External metadata source abstractions and concrete adapters.

pub mod google_books;
mod http;
pub mod omdb;
pub mod title_list;

pub use google_books::GoogleBooksSource;
pub use omdb::OmdbSource;
pub use title_list::TitleListFile;

use crate::error::SourceError;
use crate::records::{BookData, MovieData};

/// Looks up book-side reception data by title.
pub trait BookSource: Send + Sync {
    /// Rating and rating count of the first matching item.
    fn fetch_book(&self, title: &str) -> Result<BookData, SourceError>;
}

/// Looks up film-side reception data by title.
pub trait MovieSource: Send + Sync {
    fn fetch_movie(&self, title: &str) -> Result<MovieData, SourceError>;
}

/// Produces raw candidate strings for the title registry.
pub trait TitleDiscoverySource {
    fn discover(&self) -> Result<Vec<String>, SourceError>;
}
