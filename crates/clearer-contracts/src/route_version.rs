/// Which route-code format the route processor expects (`spec` §6, "Route-code
/// versions"). The core selects this by configuration; the contract address
/// for each version is supplied externally, never hardcoded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum RouteProcessorVersion {
    #[strum(serialize = "3")]
    V3,
    #[strum(serialize = "3.1")]
    V3_1,
    #[strum(serialize = "3.2")]
    V3_2,
    #[strum(serialize = "4")]
    V4,
}

impl RouteProcessorVersion {
    /// Version 4 is the current default; 3.2 is the legacy default (`spec`
    /// §6).
    pub const DEFAULT: Self = Self::V4;

    pub const LEGACY_DEFAULT: Self = Self::V3_2;
}

impl Default for RouteProcessorVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}
