//! NetCDF-backed [`DataStore`].

use gcmqm_grid::{GridError, Gridded, NetcdfSource, write_netcdf};
use gcmqm_pipeline::{DataStore, Output};

use crate::paths::Layout;

/// Reads inputs and writes outputs as NetCDF files under a [`Layout`].
#[derive(Debug)]
pub struct NetcdfStore {
    layout: Layout,
}

impl NetcdfStore {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }
}

impl DataStore for NetcdfStore {
    type Source = NetcdfSource;

    fn observations(&self, obs_name: &str) -> NetcdfSource {
        NetcdfSource::new(self.layout.observation_input(obs_name))
    }

    fn model(&self, variable: &str, gcm: &str, experiment: &str) -> NetcdfSource {
        NetcdfSource::new(self.layout.model_input(variable, gcm, experiment))
    }

    fn write(&mut self, output: Output<'_>, gridded: &Gridded) -> Result<(), GridError> {
        write_netcdf(&self.layout.output(output), gridded)
    }
}
