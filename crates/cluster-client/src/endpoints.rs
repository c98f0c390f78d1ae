//! URL construction for the backend's administrative, data and inventory APIs.

use index_query::Query;
use std::fmt;
use std::str::FromStr;

/// Inventory listings served by the cluster controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inventory {
    Cores,
    Servers,
    Volumes,
    Routes,
}

impl Inventory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Inventory::Cores => "cores",
            Inventory::Servers => "servers",
            Inventory::Volumes => "volumes",
            Inventory::Routes => "routes",
        }
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Inventory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cores" => Ok(Inventory::Cores),
            "servers" => Ok(Inventory::Servers),
            "volumes" => Ok(Inventory::Volumes),
            "routes" => Ok(Inventory::Routes),
            other => Err(format!(
                "Unknown inventory '{other}'. Expected cores, servers, volumes or routes"
            )),
        }
    }
}

/// URL builder rooted at the cluster base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    /// Build endpoints from a base URL or a bare host/IP.
    ///
    /// A value without a scheme is treated as `http://{value}`.
    pub fn new(base: &str) -> Self {
        let base = base.trim().trim_end_matches('/');
        let base = if base.starts_with("http://") || base.starts_with("https://") {
            base.to_string()
        } else {
            format!("http://{base}")
        };
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn solr(&self) -> String {
        format!("{}/solr", self.base)
    }

    fn collection_servlet(&self) -> String {
        format!("{}/solr/servlets/collection", self.base)
    }

    fn controller(&self) -> String {
        format!("{}/dkubectrlr", self.base)
    }

    pub fn select(&self, collection: &str, query: &Query) -> String {
        format!(
            "{}/{collection}/select?{}",
            self.solr(),
            query.to_query_string()
        )
    }

    pub fn ping_collection(&self, collection: &str) -> String {
        format!("{}/{collection}/admin/ping", self.solr())
    }

    pub fn ping_core(&self, core: &str) -> String {
        format!("{}/{core}/select?q=*:*&rows=0&wt=json", self.solr())
    }

    pub fn create_core(
        &self,
        core: &str,
        config_set: &str,
        collection: &str,
        route_value: &str,
    ) -> String {
        format!(
            "{}?type=CREATECORE&corename={core}&configSet={config_set}&cvCollection={collection}&routeValue={route_value}",
            self.collection_servlet()
        )
    }

    pub fn delete_core(&self, core: &str) -> String {
        format!(
            "{}?type=DELETECORE&corename={core}",
            self.collection_servlet()
        )
    }

    pub fn update_routes(&self, collection: &str) -> String {
        format!(
            "{}/solr/api/admin/cvroutes/update?cvCollection={collection}",
            self.base
        )
    }

    pub fn update(&self, collection: &str) -> String {
        format!("{}/{collection}/update", self.solr())
    }

    pub fn commit(&self, collection: &str) -> String {
        format!("{}/{collection}/update?commit=true", self.solr())
    }

    pub fn unload_collection(&self, collection: &str) -> String {
        format!(
            "{}/unloadcollection?cvCollection={collection}",
            self.controller()
        )
    }

    pub fn inventory(&self, inventory: Inventory) -> String {
        format!("{}/{}", self.controller(), inventory.as_str())
    }
}
