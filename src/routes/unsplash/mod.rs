mod handler;
mod model;

pub use handler::{search, stats};
pub use model::{
    DEFAULT_ORIENTATION, DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE, MIN_PER_PAGE, SearchParams,
    StatsResponse,
};
