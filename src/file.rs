use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use log::info;
use nalgebra::Vector3;

use crate::body::{Body, Scenario};

/// The sample initial conditions offered when no input file exists. Earth,
/// the Moon, and three artificial satellites, for 27 days (one lunar orbit).
const SAMPLE_FILE: &str = "\
days, 27

Earth
mass, 5.97e24
position, 0, 0, 0
velocity, 0, 0, 0

Moon
mass, 7.34e22
position, 3.84e8, 0, 0
velocity, 0, 1000, 0

GeostationarySatellite
mass, 1200
position, 3.58e7, 0, 0
velocity, 0, 3070, 0

InternationalSpaceStation
mass, 419455
position, 740626.73, -6644976.48, 1151109.69
velocity, 4724.433862, 1545.169511, 5838.010655

LunarReconOrbiter
mass, 1000
position, 3.84e8, 0, 1.787e6
velocity, -1600, 1000, 0
";

/// Reads and validates an initial-conditions file.
pub fn read_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| {
        format!(
            "could not read initial conditions from {}; \
             run with --generate-sample to create a starting point",
            path.display()
        )
    })?;
    info!("found {}, reading data", path.display());
    parse_scenario(&text)
}

/// Parses the `days, N` header followed by one block per body:
/// name line, `mass, m`, `position, x, y, z`, `velocity, x, y, z`.
/// Blank lines between blocks are ignored.
///
/// Validation happens here, before anything reaches the engines: days and
/// every mass must be positive, and at least two bodies are required for the
/// force sums to mean anything.
pub fn parse_scenario(text: &str) -> Result<Scenario> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let header = lines
        .next()
        .context("initial conditions are empty; expected a `days, N` header")?;
    let days = parse_days(header)?;

    let mut bodies = Vec::new();
    while let Some(name) = lines.next() {
        let mass = parse_fields(next_line(&mut lines, name, "mass")?, "mass", 1)?[0];
        ensure!(
            mass > 0.0,
            "the mass of {name} is zero or negative ({mass:.3e} kg); \
             change it to a positive value"
        );

        let p = parse_fields(next_line(&mut lines, name, "position")?, "position", 3)?;
        let v = parse_fields(next_line(&mut lines, name, "velocity")?, "velocity", 3)?;

        bodies.push(Body::new(
            name,
            mass,
            Vector3::new(p[0], p[1], p[2]),
            Vector3::new(v[0], v[1], v[2]),
        ));
    }

    ensure!(
        bodies.len() >= 2,
        "only {} object(s) listed; this simulation requires at least two bodies",
        bodies.len()
    );

    info!(
        "read {} objects, simulating orbits for {} days",
        bodies.len(),
        days
    );
    Ok(Scenario { days, bodies })
}

/// Writes the built-in sample scenario to `path`.
pub fn write_sample_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, SAMPLE_FILE)
        .with_context(|| format!("could not write sample file {}", path.display()))?;
    info!("sample file {} has been created", path.display());
    Ok(())
}

fn next_line<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    body: &str,
    key: &str,
) -> Result<&'a str> {
    lines
        .next()
        .with_context(|| format!("unexpected end of file: {body} is missing its {key} line"))
}

fn parse_days(line: &str) -> Result<u32> {
    let mut fields = line.split(',').map(str::trim);
    match fields.next() {
        Some(key) if key.eq_ignore_ascii_case("days") => {}
        _ => bail!("expected the file to start with `days, N`, found {line:?}"),
    }
    let value = fields
        .next()
        .with_context(|| format!("missing value in header {line:?}"))?;
    let days: i64 = value
        .parse()
        .with_context(|| format!("days to simulate is not an integer: {value:?}"))?;
    ensure!(
        days > 0,
        "days to simulate is not a positive integer ({days}); \
         change it to a nonzero positive value"
    );
    Ok(days as u32)
}

/// Parses `key, v1[, v2, ...]` into exactly `count` floats.
fn parse_fields(line: &str, key: &str, count: usize) -> Result<Vec<f64>> {
    let mut fields = line.split(',').map(str::trim);
    match fields.next() {
        Some(found) if found.eq_ignore_ascii_case(key) => {}
        _ => bail!("expected a `{key}` line, found {line:?}"),
    }

    let values = fields
        .filter(|field| !field.is_empty())
        .map(|field| {
            field
                .parse::<f64>()
                .with_context(|| format!("bad number {field:?} in {key} line {line:?}"))
        })
        .collect::<Result<Vec<f64>>>()?;
    ensure!(
        values.len() == count,
        "expected {count} value(s) in {key} line, found {} in {line:?}",
        values.len()
    );
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_sample_file() {
        let scenario = parse_scenario(SAMPLE_FILE).unwrap();
        assert_eq!(scenario.days, 27);
        assert_eq!(scenario.bodies.len(), 5);

        let moon = &scenario.bodies[1];
        assert_eq!(moon.name, "Moon");
        assert_eq!(moon.mass, 7.34e22);
        assert_eq!(moon.position, Vector3::new(3.84e8, 0.0, 0.0));
        assert_eq!(moon.velocity, Vector3::new(0.0, 1000.0, 0.0));
    }

    #[test]
    fn rejects_nonpositive_days() {
        let text = "days, 0\n\nA\nmass, 1\nposition, 0, 0, 0\nvelocity, 0, 0, 0\n\
                    \nB\nmass, 1\nposition, 1, 0, 0\nvelocity, 0, 0, 0\n";
        assert!(parse_scenario(text).is_err());
    }

    #[test]
    fn rejects_nonpositive_mass() {
        let text = "days, 5\n\nA\nmass, -2.0\nposition, 0, 0, 0\nvelocity, 0, 0, 0\n\
                    \nB\nmass, 1\nposition, 1, 0, 0\nvelocity, 0, 0, 0\n";
        let error = parse_scenario(text).unwrap_err();
        assert!(error.to_string().contains('A'), "{error}");
    }

    #[test]
    fn rejects_fewer_than_two_bodies() {
        let text = "days, 5\n\nAlone\nmass, 1\nposition, 0, 0, 0\nvelocity, 0, 0, 0\n";
        assert!(parse_scenario(text).is_err());
    }

    #[test]
    fn rejects_truncated_body_block() {
        let text = "days, 5\n\nA\nmass, 1\nposition, 0, 0, 0\n";
        assert!(parse_scenario(text).is_err());
    }

    #[test]
    fn sample_file_round_trips_through_disk() {
        let path =
            std::env::temp_dir().join(format!("orbit-sim-sample-{}.ini", std::process::id()));
        write_sample_file(&path).unwrap();
        let scenario = read_scenario(&path).unwrap();
        assert_eq!(scenario.bodies.len(), 5);
        std::fs::remove_file(&path).unwrap();
    }
}
