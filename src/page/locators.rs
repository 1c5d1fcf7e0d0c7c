use crate::config::SiteConfig;

/// The fixed CSS selector set probed by the page model. Immutable for
/// the lifetime of a [`LandingPage`](super::LandingPage).
#[derive(Debug, Clone)]
pub struct Locators {
    pub header: String,
    pub footer: String,
    pub cookie_accept: String,
    pub promo_container: String,
    pub promo_close: String,
}

impl Default for Locators {
    fn default() -> Self {
        Self::from_site(&SiteConfig::default())
    }
}

impl Locators {
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            header: site.header_selector.clone(),
            footer: site.footer_selector.clone(),
            cookie_accept: site.cookie_accept_selector.clone(),
            promo_container: site.promo_container_selector.clone(),
            promo_close: site.promo_close_selector.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locators_mirror_site_defaults() {
        let locators = Locators::default();
        assert_eq!(locators.header, "header, [role='banner']");
        assert_eq!(locators.footer, "footer, .MainSiteFooter");
        assert!(locators.promo_close.contains("div.dialogContents"));
    }
}
