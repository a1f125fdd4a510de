use wildlife_sync_core::{
    host::{SpawnWorkspace, TerrainQuery},
    AreaName, EnvironmentAnchorSet, HostError,
};

/// Recomputes terrain anchors and writes them into the spawn workspace.
#[derive(Debug, Default)]
pub struct EnvironmentAnchorCache {
    last: Option<EnvironmentAnchorSet>,
}

impl EnvironmentAnchorCache {
    /// Creates a cache that has not computed anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the anchors of `area` and installs them in `host`.
    ///
    /// Any failing query leaves the workspace untouched.
    pub fn refresh<H>(
        &mut self,
        area: &AreaName,
        host: &mut H,
    ) -> Result<&EnvironmentAnchorSet, HostError>
    where
        H: TerrainQuery + SpawnWorkspace + ?Sized,
    {
        let anchors = match compute(area, &*host) {
            Ok(anchors) => anchors,
            Err(error) => {
                log::warn!("anchors of '{area}' not refreshed: {error}");
                return Err(error);
            }
        };

        log::trace!(
            "'{area}' anchors: {} trees, {} bushes, {} stumps, {} water",
            anchors.trees.len(),
            anchors.bushes.len(),
            anchors.stumps.len(),
            anchors.water.len()
        );
        host.set_anchors(anchors.clone());
        Ok(self.last.insert(anchors))
    }

    /// Anchors computed by the latest successful refresh.
    #[must_use]
    pub fn last(&self) -> Option<&EnvironmentAnchorSet> {
        self.last.as_ref()
    }
}

fn compute<H>(area: &AreaName, host: &H) -> Result<EnvironmentAnchorSet, HostError>
where
    H: TerrainQuery + ?Sized,
{
    Ok(EnvironmentAnchorSet {
        area: area.clone(),
        trees: host.trees(area)?,
        bushes: host.bushes(area)?,
        stumps: host.stumps(area)?,
        water: host.water(area)?,
    })
}
