use std::fmt;

/// Which flavor of controller sits behind the base URL.
///
/// Gateways running UniFi OS proxy the Network application under
/// `/proxy/network` and authenticate through `/api/auth/*`; a standalone
/// Network application serves both at the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPlatform {
    /// UDM, UCG, UDR and other UniFi OS consoles.
    UnifiOs,
    /// Self-hosted Network application (historically `v4`/`v5`).
    ClassicController,
}

impl ControllerPlatform {
    /// Inserted between the base URL and `/api/s/{site}`.
    pub fn legacy_prefix(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network",
            Self::ClassicController => "",
        }
    }

    pub fn login_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/login",
            Self::ClassicController => "/api/login",
        }
    }

    pub fn logout_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/logout",
            Self::ClassicController => "/api/logout",
        }
    }
}

impl fmt::Display for ControllerPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnifiOs => "unifi-os",
            Self::ClassicController => "classic",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifi_os_routes_through_the_console_proxy() {
        let platform = ControllerPlatform::UnifiOs;
        assert_eq!(platform.legacy_prefix(), "/proxy/network");
        assert_eq!(platform.login_path(), "/api/auth/login");
        assert_eq!(platform.logout_path(), "/api/auth/logout");
        assert_eq!(platform.to_string(), "unifi-os");
    }

    #[test]
    fn classic_controller_serves_from_the_root() {
        let platform = ControllerPlatform::ClassicController;
        assert_eq!(platform.legacy_prefix(), "");
        assert_eq!(platform.login_path(), "/api/login");
        assert_eq!(platform.logout_path(), "/api/logout");
        assert_eq!(platform.to_string(), "classic");
    }
}
