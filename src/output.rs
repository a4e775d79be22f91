use std::path::Path;

use terrachrone_core::output::{FeatureSink, GeoJsonSink, ToFeature};
use terrachrone_core::Error;

/// Write one GeoJSON layer, creating its directory when needed
pub fn write_layer<'a, R, I>(path: &Path, records: I) -> Result<(), Error>
where
    R: ToFeature + 'a,
    I: IntoIterator<Item = &'a R>,
{
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut sink = GeoJsonSink::new(path);
    FeatureSink::<R>::write_all(&mut sink, records)?;
    FeatureSink::<R>::finish(&mut sink)
}
