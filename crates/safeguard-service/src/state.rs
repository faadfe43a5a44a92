//! Application state shared by the axum handlers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use safeguard_lib::{
    load_network, network_path, Error as LibError, HazardSource, JsonStore, RoutingConfig,
    SafePointSource, SafeRouteEngine,
};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Network file not found.
    NetworkNotFound(String),

    /// Failed to load or parse the road network.
    NetworkLoad(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkNotFound(path) => write!(f, "road network not found: {}", path),
            Self::NetworkLoad(e) => write!(f, "failed to load road network: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NetworkLoad(e) => Some(e),
            Self::NetworkNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::NetworkLoad(err)
    }
}

/// Shared application state.
///
/// Cheap to clone; the engine and the data sources live behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    engine: SafeRouteEngine,
    hazards: Arc<dyn HazardSource>,
    safe_points: Arc<dyn SafePointSource>,
}

impl AppState {
    /// Load the network from `data_dir` and read hazards and safe points from
    /// the JSON collections next to it.
    ///
    /// `data_dir` may also name the network file directly.
    pub fn load(data_dir: impl AsRef<Path>, config: RoutingConfig) -> Result<Self, AppStateError> {
        let data_dir = data_dir.as_ref();
        let network_file = network_path(data_dir);

        if !network_file.exists() {
            return Err(AppStateError::NetworkNotFound(
                network_file.display().to_string(),
            ));
        }

        tracing::info!(path = %network_file.display(), "loading road network");
        let network = load_network(&network_file)?;

        let store_dir: PathBuf = if data_dir.is_dir() {
            data_dir.to_path_buf()
        } else {
            data_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        };
        let store = Arc::new(JsonStore::new(store_dir));

        let engine = SafeRouteEngine::with_spatial_index(network, config);
        Ok(Self::from_components(engine, store.clone(), store))
    }

    /// Assemble state from an engine and arbitrary sources.
    pub fn from_components(
        engine: SafeRouteEngine,
        hazards: Arc<dyn HazardSource>,
        safe_points: Arc<dyn SafePointSource>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                engine,
                hazards,
                safe_points,
            }),
        }
    }

    pub fn engine(&self) -> &SafeRouteEngine {
        &self.inner.engine
    }

    pub fn hazards(&self) -> &dyn HazardSource {
        self.inner.hazards.as_ref()
    }

    pub fn safe_points(&self) -> &dyn SafePointSource {
        self.inner.safe_points.as_ref()
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.inner.engine)
            .finish_non_exhaustive()
    }
}
