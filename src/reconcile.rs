//! Reconciliation of free-text unit/food names against the backend catalog.
//!
//! Exact case-insensitive match wins; otherwise the entry is created and the
//! new identifier returned. Resolution is sequential (`&mut self`) and each
//! distinct name is checked-then-created at most once per publish call, so a
//! new name appearing in several ingredients of one recipe never races
//! itself into duplicate catalog entries.

use std::collections::HashMap;

use log::debug;

use crate::error::ImportError;
use crate::mealie::MealieClient;

/// A catalog entry reference submitted with an ingredient
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRef {
    pub id: String,
    pub name: String,
}

/// Per-publish name resolver.
///
/// The caches live exactly as long as one publish operation; nothing persists
/// across publishes and names are re-resolved next time.
pub struct CatalogResolver<'a> {
    client: &'a MealieClient,
    units: HashMap<String, ResolvedRef>,
    foods: HashMap<String, ResolvedRef>,
}

impl<'a> CatalogResolver<'a> {
    pub fn new(client: &'a MealieClient) -> Self {
        CatalogResolver {
            client,
            units: HashMap::new(),
            foods: HashMap::new(),
        }
    }

    /// Resolve a unit name to a catalog reference.
    ///
    /// Empty or absent names resolve to `None` without touching the backend;
    /// a blank unit must never become a catalog entry. Units match by name or
    /// abbreviation.
    pub async fn resolve_unit(
        &mut self,
        name: Option<&str>,
    ) -> Result<Option<ResolvedRef>, ImportError> {
        let Some(name) = normalize(name) else {
            return Ok(None);
        };
        let key = name.to_lowercase();

        if let Some(cached) = self.units.get(&key) {
            debug!("Unit '{}' resolved from publish cache", name);
            return Ok(Some(cached.clone()));
        }

        let existing = self
            .client
            .search_units(&name)
            .await?
            .into_iter()
            .find(|u| u.name.to_lowercase() == key || u.abbreviation.to_lowercase() == key);

        let resolved = match existing {
            Some(unit) => ResolvedRef {
                id: unit.id,
                name: unit.name,
            },
            None => {
                let unit = self.client.create_unit(&name).await?;
                ResolvedRef {
                    id: unit.id,
                    name: unit.name,
                }
            }
        };

        self.units.insert(key, resolved.clone());
        Ok(Some(resolved))
    }

    /// Resolve a food name to a catalog reference. Same policy as units,
    /// matching on name only.
    pub async fn resolve_food(
        &mut self,
        name: Option<&str>,
    ) -> Result<Option<ResolvedRef>, ImportError> {
        let Some(name) = normalize(name) else {
            return Ok(None);
        };
        let key = name.to_lowercase();

        if let Some(cached) = self.foods.get(&key) {
            debug!("Food '{}' resolved from publish cache", name);
            return Ok(Some(cached.clone()));
        }

        let existing = self
            .client
            .search_foods(&name)
            .await?
            .into_iter()
            .find(|f| f.name.to_lowercase() == key);

        let resolved = match existing {
            Some(food) => ResolvedRef {
                id: food.id,
                name: food.name,
            },
            None => {
                let food = self.client.create_food(&name).await?;
                ResolvedRef {
                    id: food.id,
                    name: food.name,
                }
            }
        };

        self.foods.insert(key, resolved.clone());
        Ok(Some(resolved))
    }
}

fn normalize(name: Option<&str>) -> Option<String> {
    let trimmed = name?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
