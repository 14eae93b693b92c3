use wpconsts::*;

use log::info;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    str::FromStr,
};

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("cannot read control file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for parameter '{key}'")]
    Parse { key: String, value: String },

    #[error("unknown parameter : {key}")]
    UnknownKey { key: String },

    #[error("parameter '{key}' has no value")]
    MissingValue { key: String },
}

#[derive(Debug, Default, Clone)]
pub struct Control {
    verbosity: String,

    sample_shape: Vec<usize>,

    band_count: usize,
    band_step: usize,
    band_offset: usize,

    localization: String, // single_point, two_point_max, max_point, projection
    localization_idx: Vec<isize>,
    localization_offset: Vec<isize>,
    localization_angle: f64,
    projection_sites: Vec<Vec<isize>>,

    hermitian_tolerance: f64,
    degeneracy_tolerance: f64,

    parallel: bool,
}

impl Control {
    pub fn new() -> Control {
        let mut control = Control::default();
        control.set_default_values();

        control
    }

    fn set_default_values(&mut self) {
        self.verbosity = "high".to_string();

        self.sample_shape = vec![1, 1, 1];

        self.band_count = 1;
        self.band_step = 1;
        self.band_offset = 0;

        self.localization = "two_point_max".to_string();
        self.localization_idx = vec![0, 0, 0];
        self.localization_offset = vec![0, 0];
        self.localization_angle = 0.0;
        self.projection_sites = Vec::new();

        self.hermitian_tolerance = HERMITIAN_TOLERANCE;
        self.degeneracy_tolerance = DEGENERACY_TOLERANCE;

        self.parallel = true;
    }

    pub fn get_verbosity(&self) -> &str {
        &self.verbosity
    }

    pub fn get_sample_shape(&self) -> &[usize] {
        &self.sample_shape
    }

    pub fn get_band_count(&self) -> usize {
        self.band_count
    }

    pub fn get_band_step(&self) -> usize {
        self.band_step
    }

    pub fn get_band_offset(&self) -> usize {
        self.band_offset
    }

    pub fn get_localization(&self) -> &str {
        &self.localization
    }

    pub fn get_localization_idx(&self) -> &[isize] {
        &self.localization_idx
    }

    pub fn get_localization_offset(&self) -> &[isize] {
        &self.localization_offset
    }

    pub fn get_localization_angle(&self) -> f64 {
        self.localization_angle
    }

    pub fn get_projection_sites(&self) -> &[Vec<isize>] {
        &self.projection_sites
    }

    pub fn get_hermitian_tolerance(&self) -> f64 {
        self.hermitian_tolerance
    }

    pub fn get_degeneracy_tolerance(&self) -> f64 {
        self.degeneracy_tolerance
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn set_localization(&mut self, scheme: &str) {
        self.localization = scheme.to_string();
    }

    pub fn read_file(&mut self, inpfile: &str) -> Result<(), ControlError> {
        let lines = read_file_data_to_vec(inpfile)?;

        self.parse_lines(&lines)
    }

    pub fn parse_str(&mut self, content: &str) -> Result<(), ControlError> {
        let lines: Vec<String> = content.lines().map(|x| x.to_string()).collect();

        self.parse_lines(&lines)
    }

    fn parse_lines(&mut self, lines: &[String]) -> Result<(), ControlError> {
        self.set_default_values();

        for line in lines.iter() {
            let line = match line.find('#') {
                Some(pos) => &line[..pos],
                None => line.as_str(),
            };

            let s: Vec<&str> = line.splitn(2, '=').map(|x| x.trim()).collect();

            let key = s[0];
            if key.is_empty() {
                continue;
            }

            let value = match s.get(1) {
                Some(v) if !v.is_empty() => *v,
                _ => {
                    return Err(ControlError::MissingValue {
                        key: key.to_string(),
                    })
                }
            };

            match key {
                "verbosity" => {
                    self.verbosity = value.to_string();
                }

                "sample_shape" => {
                    self.sample_shape = parse_list(key, value)?;
                }

                "band_count" => {
                    self.band_count = parse_value(key, value)?;
                }

                "band_step" => {
                    self.band_step = parse_value(key, value)?;
                }

                "band_offset" => {
                    self.band_offset = parse_value(key, value)?;
                }

                "localization" => {
                    self.localization = value.to_string();
                }

                "localization_idx" => {
                    self.localization_idx = parse_list(key, value)?;
                }

                "localization_offset" => {
                    self.localization_offset = parse_list(key, value)?;
                }

                "localization_angle" => {
                    self.localization_angle = parse_value(key, value)?;
                }

                // sites separated by ';', components by whitespace
                "projection_sites" => {
                    self.projection_sites = value
                        .split(';')
                        .filter(|x| !x.trim().is_empty())
                        .map(|site| parse_list(key, site))
                        .collect::<Result<Vec<_>, _>>()?;
                }

                "hermitian_tolerance" => {
                    self.hermitian_tolerance = parse_value(key, value)?;
                }

                "degeneracy_tolerance" => {
                    self.degeneracy_tolerance = parse_value(key, value)?;
                }

                "parallel" => {
                    self.parallel = parse_value(key, value)?;
                }

                _ => {
                    return Err(ControlError::UnknownKey {
                        key: key.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn display(&self) {
        const OUT_WIDTH1: usize = 28;
        const OUT_WIDTH2: usize = 18;

        info!("   {:-^80}", " control parameters ");

        let rows: Vec<(&str, String)> = vec![
            ("verbosity", self.verbosity.clone()),
            ("sample_shape", format!("{:?}", self.sample_shape)),
            ("band_count", self.band_count.to_string()),
            ("band_step", self.band_step.to_string()),
            ("band_offset", self.band_offset.to_string()),
            ("localization", self.localization.clone()),
            ("localization_idx", format!("{:?}", self.localization_idx)),
            ("localization_offset", format!("{:?}", self.localization_offset)),
            ("localization_angle", format!("{:.6}", self.localization_angle)),
            ("projection_sites", self.projection_sites.len().to_string()),
            ("hermitian_tolerance", format!("{:.3E}", self.hermitian_tolerance)),
            ("degeneracy_tolerance", format!("{:.3E}", self.degeneracy_tolerance)),
            ("parallel", self.parallel.to_string()),
        ];

        for (key, value) in rows.iter() {
            info!(
                "   {:<width1$} = {:>width2$}",
                key,
                value,
                width1 = OUT_WIDTH1,
                width2 = OUT_WIDTH2
            );
        }
    }
}

fn read_file_data_to_vec(inpfile: &str) -> Result<Vec<String>, ControlError> {
    let file = File::open(inpfile).map_err(|source| ControlError::Io {
        path: inpfile.to_string(),
        source,
    })?;

    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(|source| ControlError::Io {
            path: inpfile.to_string(),
            source,
        })
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ControlError> {
    value.parse::<T>().map_err(|_| ControlError::Parse {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_list<T: FromStr>(key: &str, value: &str) -> Result<Vec<T>, ControlError> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|x| !x.is_empty())
        .map(|x| parse_value(key, x))
        .collect()
}
