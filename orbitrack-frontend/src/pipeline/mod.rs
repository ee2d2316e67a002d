mod propagator;
mod tracking;

pub use propagator::{
    Geodetic, ParseError, Propagator, Sgp4Handle, Sgp4Propagator, eci_to_geodetic, greenwich_mean_sidereal_time,
};
pub use tracking::{
    GlobeMapping, PositionPipeline, TrackedInfo, TrackedObject, TrackedSet, UNKNOWN_ID, UNKNOWN_NAME,
    split_element_set,
};

#[cfg(test)]
pub(crate) use tracking::tests::{FakePropagator, epoch as test_epoch, fake_pipeline};
