use crate::errors::NitriteError;
use crate::migration::Migration;
use crate::{errors::NitriteResult, nitrite::Nitrite, nitrite_config::NitriteConfig, NitriteModule};

/// Builder for creating and configuring a Nitrite database instance.
///
/// `NitriteBuilder` provides a fluent API for configuring database options before
/// opening or creating a database. It follows the builder pattern and captures errors
/// during configuration to ensure they are propagated when opening the database.
///
/// # Examples
///
/// ```rust,ignore
/// use nitrite::nitrite_builder::NitriteBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create a database with default settings
/// let db = Nitrite::builder()
///     .open_or_create(None, None)?;
///
/// // Create a database with custom configuration
/// let db = Nitrite::builder()
///     .field_separator("|")
///     .schema_version(2)
///     .open_or_create(None, None)?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct NitriteBuilder {
    error: Option<NitriteError>,
    nitrite_config: NitriteConfig,
}

impl NitriteBuilder {
    /// Creates a new `NitriteBuilder` with default configuration.
    ///
    /// The default configuration uses an in-memory store, "." as field separator,
    /// and schema version 1.
    ///
    /// # Returns
    ///
    /// A new `NitriteBuilder` instance.
    pub fn new() -> Self {
        NitriteBuilder {
            error: None,
            nitrite_config: NitriteConfig::new() 
        }
    }

    /// Sets the field separator for nested document fields.
    ///
    /// The field separator is used to access nested fields in documents using dot-notation
    /// or custom separator. For example, with "." as separator, `document.get("user.name")`
    /// retrieves the `name` field inside a nested `user` document.
    ///
    /// # Arguments
    ///
    /// * `field_separator` - A non-empty string to use as the field separator
    ///
    /// # Returns
    ///
    /// This `NitriteBuilder` for method chaining.
    ///
    /// # Panics
    ///
    /// If `field_separator` is empty, the error is captured and will be returned
    /// when calling `open_or_create()`.
    pub fn field_separator(mut self, field_separator: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.nitrite_config.set_field_separator(field_separator) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Loads a plugin module into the database.
    ///
    /// Modules can provide additional functionality such as storage backends, indexing
    /// strategies, or spatial capabilities. For example, the `nitrite-spatial` module
    /// provides spatial indexing and query support.
    ///
    /// # Arguments
    ///
    /// * `module` - A type implementing `NitriteModule`
    ///
    /// # Returns
    ///
    /// This `NitriteBuilder` for method chaining.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use nitrite::nitrite_builder::NitriteBuilder;
    /// use nitrite_spatial::SpatialModule;
    ///
    /// let db = Nitrite::builder()
    ///     .load_module(SpatialModule)
    ///     .open_or_create(None, None)?;
    /// ```
    pub fn load_module<T: NitriteModule + 'static>(mut self, module: T) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.nitrite_config.load_module(module) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the schema version for the database.
    ///
    /// The schema version helps track database structure and enables migrations.
    /// When opening an existing database, the version is compared to detect schema changes.
    ///
    /// # Arguments
    ///
    /// * `schema_version` - The schema version number (should be >= 1)
    ///
    /// # Returns
    ///
    /// This `NitriteBuilder` for method chaining.
    pub fn schema_version(mut self, schema_version: u32) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.nitrite_config.set_schema_version(schema_version) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Adds a migration to be executed when opening the database.
    ///
    /// Migrations are executed in order when the database schema version changes.
    /// This allows for automatic schema evolution and data transformation.
    ///
    /// # Arguments
    ///
    /// * `migration` - A `Migration` defining version transitions and transformation steps
    ///
    /// # Returns
    ///
    /// This `NitriteBuilder` for method chaining.
    pub fn add_migration(mut self, migration: Migration) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.nitrite_config.add_migration(migration) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens or creates a database with the configured settings.
    ///
    /// This method finalizes the builder configuration and attempts to open or create
    /// a database instance. Any errors captured during configuration will be returned here.
    ///
    /// # Arguments
    ///
    /// * `username` - Optional username for authentication
    /// * `password` - Optional password for authentication
    ///
    /// # Returns
    ///
    /// `Ok(Nitrite)` if the database opened successfully, or `Err(NitriteError)` if
    /// configuration validation or database opening failed.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let db = NitriteBuilder::new()
    ///     .field_separator(".")
    ///     .open_or_create(None, None)?;
    /// ```
    pub fn open_or_create(self, username: Option<&str>, password: Option<&str>) -> NitriteResult<Nitrite> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.nitrite_config.auto_configure()?;
        let nitrite = Nitrite::new(self.nitrite_config);
        nitrite.initialize(username, password)?;
        Ok(nitrite)
    }
}
