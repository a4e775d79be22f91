mod multi_source;
mod state;

pub(crate) use multi_source::multi_source_costs;
