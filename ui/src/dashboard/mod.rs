//! Dashboard bindings and their views.
//!
//! Each binding is a plain function over the shared [`MetricsTable`](crate::core::MetricsTable)
//! so it can be tested without rendering; the components only own control state
//! (selected cluster, metric, count) and call the bindings on every render.

pub mod charts;
pub mod distribution;
pub mod export;
pub mod gallery;
pub mod router;
pub mod summary;
pub mod table_view;
pub mod top;

pub use distribution::{
    box_by_cluster, correlation, histogram, ClusterBox, CorrelationMatrix, DistributionView,
    Histogram,
};
pub use export::{export_csv, CsvExport, ExportError, ExportPanel};
pub use gallery::{gallery, GalleryView, ImageCard};
pub use router::{route, SummaryStats, Tab, TabView};
pub use summary::{pca_points, PcaPoint, SummaryPanel};
pub use table_view::{table_page, MetricsTableView, SortDirection, TablePage, TableQuery};
pub use top::{top_images, TopCard, TopOutcome, TopView};
