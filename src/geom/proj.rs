use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, MapCoords};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::geom::{CoordinateFrame, RegionSource};

/// PROJ.4 definition for the frames this crate knows how to convert between.
/// The flag is true for geographic (degree-valued) frames.
fn proj4_definition(frame: CoordinateFrame) -> Result<(&'static str, bool)> {
    match frame.epsg() {
        Some(4326) => Ok(("+proj=longlat +datum=WGS84 +no_defs +type=crs", true)),
        Some(4269) => Ok(("+proj=longlat +datum=NAD83 +no_defs +type=crs", true)),
        // TWD97 / TM2 zone 121, the frame of Taiwan's township boundary layer.
        Some(3826) => Ok((
            "+proj=tmerc +lat_0=0 +lon_0=121 +k=0.9999 +x_0=250000 +y_0=0 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs +type=crs",
            false,
        )),
        Some(3857) => Ok((
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs",
            false,
        )),
        Some(code) => bail!("[geom::proj] unsupported frame EPSG:{code}"),
        None => bail!("[geom::proj] cannot reproject untagged geometry"),
    }
}

/// Reproject region boundaries in place to `to`, retagging their frame.
///
/// Reprojection is a loader concern: the index itself only compares frame tags.
pub fn reproject(sources: &mut [RegionSource], to: CoordinateFrame) -> Result<()> {
    let (to_def, to_geographic) = proj4_definition(to)?;
    let target = Proj4::from_proj_string(to_def)
        .map_err(|e| anyhow!("failed to build target PROJ.4 {to_def}: {e:?}"))?;

    for source in sources.iter_mut() {
        if source.frame == to { continue }

        let (from_def, from_geographic) = proj4_definition(source.frame)
            .with_context(|| format!("[geom::proj] region '{}'", source.name))?;
        let origin = Proj4::from_proj_string(from_def)
            .map_err(|e| anyhow!("failed to build source PROJ.4 {from_def}: {e:?}"))?;

        source.boundary = source.boundary.try_map_coords(|coord: Coord<f64>| {
            let mut point = if from_geographic {
                (coord.x.to_radians(), coord.y.to_radians(), 0.0)
            } else {
                (coord.x, coord.y, 0.0)
            };
            transform(&origin, &target, &mut point)?;
            Ok::<_, proj4rs::errors::Error>(if to_geographic {
                Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
            } else {
                Coord { x: point.0, y: point.1 }
            })
        }).map_err(|e| anyhow!("[geom::proj] transform failed for region '{}': {e:?}", source.name))?;

        source.frame = to;
    }

    Ok(())
}
