pub(crate) mod centroid;
pub(crate) mod geodesic;
