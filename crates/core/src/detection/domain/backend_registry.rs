use super::backend::{Backend, BackendError};
use super::stub_backend::StubBackend;

/// Builds a backend bound to a `width × height` frame.
pub type BackendFactory =
    Box<dyn Fn(u32, u32) -> Result<Box<dyn Backend>, BackendError> + Send + Sync>;

struct Entry {
    name: String,
    factory: BackendFactory,
}

/// Ordered list of constructible backends, most preferred first.
///
/// The stub backend is always present and always last, so the registry is
/// never empty and every frame size has at least one usable backend.
pub struct BackendRegistry {
    entries: Vec<Entry>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        let stub: BackendFactory = Box::new(|width, height| -> Result<Box<dyn Backend>, BackendError> {
            Ok(Box::new(StubBackend::new(width, height)))
        });
        Self {
            entries: vec![Entry {
                name: StubBackend::NAME.to_owned(),
                factory: stub,
            }],
        }
    }

    /// Adds a backend ahead of the stub, after every earlier registration.
    ///
    /// Registering a name that already exists replaces its factory in place.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(u32, u32) -> Result<Box<dyn Backend>, BackendError> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: BackendFactory = Box::new(factory);

        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.factory = factory;
        } else {
            let stub_position = self.entries.len() - 1;
            self.entries.insert(stub_position, Entry { name, factory });
        }
        self
    }

    /// Backend names in preference order. The last one is always `"stub"`.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn default_backend(&self) -> &str {
        &self.entries[0].name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Constructs the backend registered under exactly `name`.
    ///
    /// Returns `None` for unknown names; construction errors are passed through.
    pub fn create(
        &self,
        name: &str,
        width: u32,
        height: u32,
    ) -> Option<Result<Box<dyn Backend>, BackendError>> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| (e.factory)(width, height))
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
