//! Test and helper mocks for rover_core

/// A sensor that always errors on sample; useful for exercising paths that
/// must never reach the sampler (e.g. the stopped branch).
pub struct NoopSensor;

impl rover_traits::RangeSensor for NoopSensor {
    fn sample(
        &mut self,
    ) -> Result<rover_traits::Reading, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("noop sensor")))
    }
}
