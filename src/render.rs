/// Porter-Duff composite modes over premultiplied RGBA8.
pub mod composite;
/// CPU rasterizer built on `vello_cpu`.
pub mod raster;
/// Rounded-rectangle path construction.
pub mod shape;
/// Owned premultiplied RGBA8 render target.
pub mod surface;
