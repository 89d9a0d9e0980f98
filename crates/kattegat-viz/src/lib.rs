//! Tables and maps for solved models.

pub mod map;
pub mod table;

pub use map::{LineOverlay, MapView, Marker};
pub use table::{
    split_generator_id, write_dispatch_table, write_flow_table, write_price_table, write_summary,
};
