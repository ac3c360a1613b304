//! Vehicle types and per-type containers.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Closed set of vehicle types in the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    T1,
    T2,
    T3,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [VehicleType::T1, VehicleType::T2, VehicleType::T3];

    /// Effective-speed multiplier applied to matrix travel times.
    pub fn travel_time_factor(self) -> f64 {
        match self {
            VehicleType::T1 => 0.90,
            VehicleType::T2 => 1.00,
            VehicleType::T3 => 1.01,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleType::T1 => "t1",
            VehicleType::T2 => "t2",
            VehicleType::T3 => "t3",
        }
    }

    fn index(self) -> usize {
        match self {
            VehicleType::T1 => 0,
            VehicleType::T2 => 1,
            VehicleType::T3 => 2,
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per [VehicleType], indexable by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerVehicle<T> {
    pub t1: T,
    pub t2: T,
    pub t3: T,
}

impl<T> PerVehicle<T> {
    pub fn new(t1: T, t2: T, t3: T) -> Self {
        Self { t1, t2, t3 }
    }

    pub fn from_fn(mut f: impl FnMut(VehicleType) -> T) -> Self {
        Self {
            t1: f(VehicleType::T1),
            t2: f(VehicleType::T2),
            t3: f(VehicleType::T3),
        }
    }

    /// Iterates in T1, T2, T3 order.
    pub fn iter(&self) -> impl Iterator<Item = (VehicleType, &T)> {
        [
            (VehicleType::T1, &self.t1),
            (VehicleType::T2, &self.t2),
            (VehicleType::T3, &self.t3),
        ]
        .into_iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(VehicleType, &T) -> U) -> PerVehicle<U> {
        PerVehicle::from_fn(|vehicle_type| f(vehicle_type, &self[vehicle_type]))
    }
}

impl<T> Index<VehicleType> for PerVehicle<T> {
    type Output = T;

    fn index(&self, vehicle_type: VehicleType) -> &T {
        match vehicle_type.index() {
            0 => &self.t1,
            1 => &self.t2,
            _ => &self.t3,
        }
    }
}

impl<T> IndexMut<VehicleType> for PerVehicle<T> {
    fn index_mut(&mut self, vehicle_type: VehicleType) -> &mut T {
        match vehicle_type.index() {
            0 => &mut self.t1,
            1 => &mut self.t2,
            _ => &mut self.t3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_match_effective_speeds() {
        assert_eq!(VehicleType::T1.travel_time_factor(), 0.90);
        assert_eq!(VehicleType::T2.travel_time_factor(), 1.00);
        assert_eq!(VehicleType::T3.travel_time_factor(), 1.01);
    }

    #[test]
    fn per_vehicle_indexes_by_type() {
        let mut counts = PerVehicle::new(1u32, 2, 3);
        counts[VehicleType::T2] += 5;
        assert_eq!(counts[VehicleType::T1], 1);
        assert_eq!(counts[VehicleType::T2], 7);
        assert_eq!(counts[VehicleType::T3], 3);

        let order: Vec<_> = counts.iter().map(|(t, _)| t).collect();
        assert_eq!(order, VehicleType::ALL.to_vec());
    }
}
