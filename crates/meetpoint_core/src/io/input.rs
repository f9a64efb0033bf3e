use std::{fs, io::Read, path::Path};

use meetpoint_derive::KvDisplay;

use crate::{Coordinate, Error, OriginPoint, Result, options::Options};

const DEFAULT_WEIGHT: f64 = 1.0;

/// Everything a solve needs from the outside world.
#[derive(Clone, Debug, KvDisplay)]
pub struct SolverInput {
    #[kv(fmt = "len")]
    pub origins: Vec<OriginPoint>,
    #[kv(fmt = "option")]
    pub seed: Option<Coordinate>,
}

impl SolverInput {
    pub fn new(origins: &[OriginPoint], seed: Option<Coordinate>) -> Self {
        Self {
            origins: origins.to_vec(),
            seed,
        }
    }

    /// Reads origins from `--input` (or stdin) and takes the seed from `--seed`.
    pub fn from_options(options: &Options) -> Result<Self> {
        let raw = match options.input_path() {
            Some(path) => read_origins_file(path)?,
            None => {
                let mut input = String::new();
                std::io::stdin().read_to_string(&mut input)?;
                input
            }
        };
        Ok(Self {
            origins: parse_origins(&raw)?,
            seed: options.seed,
        })
    }
}

fn read_origins_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::invalid_input(format!("failed to read input {}: {e}", path.display()))
    })
}

/// Parses whitespace-separated `lat,lng[,weight]` tokens. `#` comments run to end of line.
pub fn parse_origins(input: &str) -> Result<Vec<OriginPoint>> {
    let mut origins = Vec::new();
    let tokens = input
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(data, _)| data))
        .flat_map(str::split_whitespace);

    for (idx, tok) in tokens.enumerate() {
        let n = idx + 1;
        let fields: Vec<&str> = tok.split(',').collect();
        let (lat_s, lng_s, weight_s) = match fields.as_slice() {
            [lat, lng] => (*lat, *lng, None),
            [lat, lng, weight] => (*lat, *lng, Some(*weight)),
            [_] => {
                return Err(Error::invalid_input(format!(
                    "Token {n}: missing longitude"
                )));
            }
            _ => {
                return Err(Error::invalid_input(format!(
                    "Token {n}: expected 'lat,lng[,weight]' but got: {tok}"
                )));
            }
        };

        let lat: f64 = lat_s
            .parse()
            .map_err(|_| Error::invalid_input(format!("Token {n}: invalid latitude: {lat_s}")))?;
        let lng: f64 = lng_s
            .parse()
            .map_err(|_| Error::invalid_input(format!("Token {n}: invalid longitude: {lng_s}")))?;
        let weight: f64 = match weight_s {
            Some(w) => w
                .parse()
                .map_err(|_| Error::invalid_input(format!("Token {n}: invalid weight: {w}")))?,
            None => DEFAULT_WEIGHT,
        };

        let origin = OriginPoint::new(lat, lng, weight)
            .map_err(|e| Error::invalid_input(format!("Token {n}: {e}")))?;
        origins.push(origin);
    }

    if origins.is_empty() {
        return Err(Error::invalid_input("No origin points provided."));
    }

    Ok(origins)
}

#[cfg(test)]
mod tests {
    use super::{SolverInput, parse_origins};
    use crate::Coordinate;

    #[test]
    fn parses_weighted_and_unweighted_tokens() {
        let origins = parse_origins("39.324389,-82.103139,1\n39.968660,-82.971611,5 40.0,-75.3")
            .expect("parse origins");
        assert_eq!(origins.len(), 3);
        assert_eq!(origins[1].weight(), 5.0);
        assert_eq!(origins[2].weight(), 1.0);
        assert_eq!(origins[2].to_string(), "40.0,-75.3,1.0");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let origins = parse_origins("# relatives\n\n35.1,-89.95,2  # Memphis\n   \n")
            .expect("parse origins");
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0].lat(), 35.1);
    }

    #[test]
    fn rejects_empty_input() {
        let err = parse_origins(" \n# nothing here\n\t ").expect_err("empty input should fail");
        assert!(err.to_string().contains("No origin points provided."));
    }

    #[test]
    fn rejects_too_many_fields() {
        let err = parse_origins("1,2,3,4").expect_err("extra fields should fail");
        assert!(err.to_string().contains("expected 'lat,lng[,weight]'"));
    }

    #[test]
    fn rejects_non_numeric_and_out_of_range_values() {
        let err = parse_origins("a,2").expect_err("bad latitude");
        assert!(err.to_string().contains("Token 1: invalid latitude"));

        let err = parse_origins("1,2 3,4,heavy").expect_err("bad weight");
        assert!(err.to_string().contains("Token 2: invalid weight"));

        let err = parse_origins("1,2,0").expect_err("zero weight");
        assert!(err.to_string().contains("weight must be a positive"));

        let err = parse_origins("91,2").expect_err("latitude out of range");
        assert!(err.to_string().contains("out of range"));

        let err = parse_origins("10").expect_err("missing longitude");
        assert!(err.to_string().contains("missing longitude"));
    }

    #[test]
    fn display_lists_origin_count_and_seed() {
        let origins = parse_origins("1,2,3 4,5").expect("parse origins");
        let input = SolverInput::new(&origins, Some(Coordinate::new(39.0, -80.0)));
        let shown = input.to_string();
        assert!(shown.contains("origins = 2"), "{shown}");
        assert!(shown.contains("seed    = 39.0,-80.0"), "{shown}");

        let unseeded = SolverInput::new(&origins, None);
        assert!(unseeded.to_string().contains("seed    = -"));
    }
}
