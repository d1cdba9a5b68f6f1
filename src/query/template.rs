//! # Query Templates
//!
//! Fixed SQL skeletons, one per endpoint. A template carries at most one
//! `{filter}` insertion point for the clause built from a [`FilterSet`] and
//! any number of `{name}` literal slots. Both become bound-parameter markers
//! when the statement is composed.

use super::filter::FilterSet;

/// Insertion point for the optional `WHERE` clause
pub const FILTER_SLOT: &str = "filter";

/// Immutable per-endpoint SQL skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    /// Stable name used in logs and by the CLI
    pub name: &'static str,

    /// SQL text with `{filter}` and `{literal}` slots
    pub sql: &'static str,

    /// Keys accepted in this template's filter set
    pub filters: &'static [&'static str],

    /// Literal slots that must be supplied at composition time
    pub literals: &'static [&'static str],

    /// Projected columns produced by aggregate functions
    pub aggregates: &'static [&'static str],
}

impl QueryTemplate {
    /// An empty filter set bound to this template's filter schema
    pub fn filter_set(&self) -> FilterSet {
        FilterSet::new(self.filters)
    }

    pub fn has_filter_slot(&self) -> bool {
        self.sql.contains("{filter}")
    }

    /// Look up a catalog template by name
    pub fn by_name(name: &str) -> Option<&'static QueryTemplate> {
        CATALOG.iter().copied().find(|t| t.name == name)
    }
}

/// Customer lookup by first and/or last name
pub const CUSTOMERS: QueryTemplate = QueryTemplate {
    name: "customers",
    sql: "SELECT * FROM customers {filter}",
    filters: &["FirstName", "LastName"],
    literals: &[],
    aggregates: &[],
};

/// City with the most purchases of a genre.
///
/// The outer `MAX` has no `GROUP BY`, so an unknown genre still yields one
/// all-null row.
pub const CITY_BY_GENRE: QueryTemplate = QueryTemplate {
    name: "city_by_genre",
    sql: "SELECT Genre, City, MAX(Purchases) AS Purchases FROM (\
          SELECT genres.Name AS Genre, invoices.BillingCity AS City, COUNT(*) AS Purchases \
          FROM genres \
          JOIN tracks ON genres.GenreId = tracks.GenreId \
          JOIN invoice_items ON tracks.TrackId = invoice_items.TrackId \
          JOIN invoices ON invoice_items.InvoiceId = invoices.InvoiceId \
          WHERE genres.Name = {genre} \
          GROUP BY invoices.BillingCity)",
    filters: &[],
    literals: &["genre"],
    aggregates: &["Purchases"],
};

/// Track detail joined across albums, artists, genres and playlists
pub const TRACK_INFO: QueryTemplate = QueryTemplate {
    name: "track_info",
    sql: "SELECT tracks.TrackId, tracks.Name AS Track, tracks.Composer, albums.Title AS Album, \
          artists.ArtistId, artists.Name AS Artist, genres.Name AS Genre, \
          playlists.Name AS Playlist, tracks.Bytes AS Size \
          FROM tracks \
          JOIN albums ON tracks.AlbumId = albums.AlbumId \
          JOIN artists ON albums.ArtistId = artists.ArtistId \
          JOIN genres ON tracks.GenreId = genres.GenreId \
          JOIN playlist_track ON tracks.TrackId = playlist_track.TrackId \
          JOIN playlists ON playlist_track.PlaylistId = playlists.PlaylistId \
          WHERE tracks.TrackId = {track_id} \
          GROUP BY tracks.TrackId",
    filters: &[],
    literals: &["track_id"],
    aggregates: &[],
};

/// Track detail with its play time and the owning album's length in hours
pub const TRACK_INFO_WITH_DURATION: QueryTemplate = QueryTemplate {
    name: "track_info_with_duration",
    sql: "SELECT tracks.TrackId, tracks.Name AS Track, tracks.Composer, albums.Title AS Album, \
          artists.Name AS Artist, genres.Name AS Genre, playlists.Name AS Playlist, \
          ((tracks.Milliseconds / 60000) % 60) || 'm:' || ((tracks.Milliseconds / 1000) % 60) || 's' AS Time, \
          (SELECT ROUND(SUM(album_tracks.Milliseconds) / 3600000.0, 2) \
           FROM tracks AS album_tracks WHERE album_tracks.AlbumId = tracks.AlbumId) AS AlbumHours, \
          tracks.Bytes AS Size \
          FROM tracks \
          JOIN albums ON tracks.AlbumId = albums.AlbumId \
          JOIN artists ON albums.ArtistId = artists.ArtistId \
          JOIN genres ON tracks.GenreId = genres.GenreId \
          JOIN playlist_track ON tracks.TrackId = playlist_track.TrackId \
          JOIN playlists ON playlist_track.PlaylistId = playlists.PlaylistId \
          WHERE tracks.TrackId = {track_id} \
          GROUP BY tracks.TrackId",
    filters: &[],
    literals: &["track_id"],
    aggregates: &[],
};

/// Sales totals per billing country, optionally narrowed to one country
pub const SALES_BY_COUNTRY: QueryTemplate = QueryTemplate {
    name: "sales_by_country",
    sql: "SELECT ROUND(SUM(invoice_items.UnitPrice * invoice_items.Quantity), 2) AS Sales, \
          invoices.BillingCountry AS BillingCountry \
          FROM invoice_items \
          JOIN invoices ON invoices.InvoiceId = invoice_items.InvoiceId \
          {filter} \
          GROUP BY invoices.BillingCountry",
    filters: &["BillingCountry"],
    literals: &[],
    aggregates: &["Sales"],
};

/// Every template served by this process
pub const CATALOG: &[&QueryTemplate] = &[
    &CUSTOMERS,
    &CITY_BY_GENRE,
    &TRACK_INFO,
    &TRACK_INFO_WITH_DURATION,
    &SALES_BY_COUNTRY,
];
