//! Local filesystem backend.

use object_store::local::LocalFileSystem;

use crate::{ContentError, ContentResult, ContentStoreConfig};

pub fn build(config: &ContentStoreConfig) -> ContentResult<LocalFileSystem> {
    let root = config
        .local_path
        .as_ref()
        .ok_or_else(|| ContentError::configuration("local_path is required for the local adapter"))?;
    std::fs::create_dir_all(root)?;
    LocalFileSystem::new_with_prefix(root).map_err(|e| {
        ContentError::configuration(format!(
            "invalid local_path {}: {}",
            root.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::AdapterType;

    #[test]
    fn test_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("content");
        let config = ContentStoreConfig {
            adapter_type: AdapterType::Local,
            local_path: Some(root.clone()),
            ..Default::default()
        };
        build(&config).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_requires_local_path() {
        let config = ContentStoreConfig {
            adapter_type: AdapterType::Local,
            ..Default::default()
        };
        assert!(matches!(
            build(&config),
            Err(ContentError::Configuration { .. })
        ));
    }
}
