use crate::config::PeriodConfig;
use crate::error::{AcmeError, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

/// Meteorological and hydrological series a catchment model is driven by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ForcingSeries {
    Precipitation,
    Discharge,
    TMean,
    TMin,
    TMax,
}

impl ForcingSeries {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Precipitation => "prec",
            Self::Discharge => "discharge",
            Self::TMean => "t_mean",
            Self::TMin => "t_min",
            Self::TMax => "t_max",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::Precipitation,
            Self::Discharge,
            Self::TMean,
            Self::TMin,
            Self::TMax,
        ]
    }

    /// Series every model needs regardless of the ET method
    pub fn required() -> Vec<Self> {
        vec![Self::Precipitation, Self::Discharge]
    }

    /// Common alternative column names
    pub fn aliases(&self) -> Vec<&'static str> {
        match self {
            Self::Precipitation => vec!["prec", "Prec", "precipitation", "Precipitation", "P"],
            Self::Discharge => vec!["discharge", "Discharge", "q", "Q", "runoff"],
            Self::TMean => vec!["t_mean", "tmean", "Tmean", "temp", "T"],
            Self::TMin => vec!["t_min", "tmin", "Tmin"],
            Self::TMax => vec!["t_max", "tmax", "Tmax"],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|s| s.aliases().contains(&name))
    }
}

const DATE_ALIASES: [&str; 4] = ["date", "Date", "datetime", "time"];

/// Index ranges into the forcing record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcingWindow {
    pub calibration: Range<usize>,
    pub validation: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForcingData {
    series: BTreeMap<ForcingSeries, Vec<f64>>,
    dates: Option<Vec<NaiveDate>>,
}

impl ForcingData {
    pub fn new(prec: Vec<f64>, discharge: Vec<f64>) -> Result<Self> {
        let data = Self {
            series: BTreeMap::from([(ForcingSeries::Precipitation, prec)]),
            dates: None,
        };
        data.with_series(ForcingSeries::Discharge, discharge)
    }

    pub fn with_series(mut self, kind: ForcingSeries, values: Vec<f64>) -> Result<Self> {
        self.check_length(kind.as_str(), values.len())?;
        self.series.insert(kind, values);
        Ok(self)
    }

    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> Result<Self> {
        self.check_length("date", dates.len())?;
        if dates.windows(2).any(|w| w[0] > w[1]) {
            return Err(AcmeError::DataLoading("Dates must be in ascending order".to_string()));
        }
        self.dates = Some(dates);
        Ok(self)
    }

    fn check_length(&self, name: &str, len: usize) -> Result<()> {
        if let Some(existing) = self.series.values().next() {
            if existing.len() != len {
                return Err(AcmeError::DataLoading(format!(
                    "Series '{}' has {} values, expected {}",
                    name,
                    len,
                    existing.len()
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.series.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn series(&self, kind: ForcingSeries) -> Option<&[f64]> {
        self.series.get(&kind).map(Vec::as_slice)
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        ForcingSeries::from_name(name).and_then(|kind| self.series(kind))
    }

    pub fn precipitation(&self) -> &[f64] {
        self.series(ForcingSeries::Precipitation).unwrap_or_default()
    }

    pub fn discharge(&self) -> &[f64] {
        self.series(ForcingSeries::Discharge).unwrap_or_default()
    }

    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.dates.as_deref()
    }

    /// Fail when any of the named series is missing
    pub fn require(&self, names: &[&str]) -> Result<()> {
        for name in names {
            if self.get(name).is_none() {
                return Err(AcmeError::DataLoading(format!("Missing forcing series: {}", name)));
            }
        }
        Ok(())
    }

    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns = df.get_column_names();
        let mut series = BTreeMap::new();

        for kind in ForcingSeries::all() {
            let found = kind
                .aliases()
                .into_iter()
                .find(|alias| columns.iter().any(|col| col.as_str() == *alias));
            match found {
                Some(name) => {
                    series.insert(kind, Self::numeric_column(df, name)?);
                }
                None if ForcingSeries::required().contains(&kind) => {
                    return Err(AcmeError::DataLoading(format!(
                        "Missing required column: {} (tried aliases: {:?})",
                        kind.as_str(),
                        kind.aliases()
                    )));
                }
                None => {}
            }
        }

        let date_column = DATE_ALIASES
            .iter()
            .find(|alias| columns.iter().any(|col| col.as_str() == **alias));
        let dates = match date_column {
            Some(name) => Some(Self::date_column(df, name)?),
            None => None,
        };

        let mut data = Self { series, dates: None };
        if let Some(dates) = dates {
            data = data.with_dates(dates)?;
        }

        log::debug!(
            "Forcing data with {} rows and series {:?}",
            data.len(),
            data.series.keys().map(|k| k.as_str()).collect::<Vec<_>>()
        );
        Ok(data)
    }

    fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let column = df.column(name)?;
        if !matches!(
            column.dtype(),
            DataType::Float64
                | DataType::Float32
                | DataType::Int64
                | DataType::Int32
                | DataType::UInt64
                | DataType::UInt32
        ) {
            return Err(AcmeError::DataLoading(format!(
                "Column '{}' must be numeric, found {:?}",
                name,
                column.dtype()
            )));
        }

        let cast = column.cast(&DataType::Float64)?;
        let values = cast.f64()?;
        let mut out = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            match values.get(i) {
                Some(v) => out.push(v),
                None => {
                    return Err(AcmeError::DataLoading(format!(
                        "Null value in column '{}' at row {}",
                        name, i
                    )))
                }
            }
        }
        Ok(out)
    }

    fn date_column(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
        let cast = df.column(name)?.cast(&DataType::String)?;
        let text = cast.str()?;
        let mut out = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let raw = text.get(i).unwrap_or("");
            let day = raw.get(..10).unwrap_or(raw);
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                AcmeError::DataLoading(format!("Invalid date '{}' at row {}: {}", raw, i, e))
            })?;
            out.push(date);
        }
        Ok(out)
    }

    /// Calibration rows are the years `start_year..=end_year`, validation rows
    /// the `validation_time_span` years after that. Without years the whole
    /// record calibrates and validation is empty.
    pub fn window(&self, period: &PeriodConfig) -> Result<ForcingWindow> {
        let len = self.len();
        if period.start_year.is_none() && period.end_year.is_none() {
            return Ok(ForcingWindow {
                calibration: 0..len,
                validation: len..len,
            });
        }

        let dates = self.dates.as_ref().ok_or_else(|| {
            AcmeError::DataLoading("Calibration years given but forcing data has no dates".to_string())
        })?;

        let first_year = dates.first().map_or(0, |d| d.year());
        let last_year = dates.last().map_or(0, |d| d.year());
        let start = period.start_year.unwrap_or(first_year);
        let end = period.end_year.unwrap_or(last_year);

        let calibration = year_range(dates, start, end);
        if calibration.is_empty() {
            return Err(AcmeError::DataLoading(format!(
                "No forcing data between {} and {}",
                start, end
            )));
        }

        let validation = if period.validation_time_span == 0 {
            calibration.end..calibration.end
        } else {
            let span = period.validation_time_span as i32;
            let range = year_range(dates, end + 1, end + span);
            if range.is_empty() {
                calibration.end..calibration.end
            } else {
                range
            }
        };

        Ok(ForcingWindow {
            calibration,
            validation,
        })
    }
}

fn year_range(dates: &[NaiveDate], first: i32, last: i32) -> Range<usize> {
    let start = dates.partition_point(|d| d.year() < first);
    let end = dates.partition_point(|d| d.year() <= last);
    start..end.max(start)
}

pub struct CsvForcingLoader;

impl CsvForcingLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ForcingData> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| AcmeError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        log::info!("Loaded {} forcing rows from {}", df.height(), path.as_ref().display());
        ForcingData::from_dataframe(&df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use std::io::Write;

    fn dated(years: &[i32]) -> ForcingData {
        let dates: Vec<NaiveDate> = years
            .iter()
            .map(|y| NaiveDate::from_ymd_opt(*y, 6, 1).unwrap())
            .collect();
        let n = dates.len();
        ForcingData::new(vec![1.0; n], vec![0.5; n])
            .unwrap()
            .with_dates(dates)
            .unwrap()
    }

    #[test]
    fn test_from_dataframe_with_aliases() {
        let df = df! {
            "Precipitation" => &[1.0, 0.0, 3.5],
            "Q" => &[0.2, 0.3, 0.4],
            "tmin" => &[1i32, 2, 3],
        }
        .unwrap();

        let data = ForcingData::from_dataframe(&df).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.precipitation(), &[1.0, 0.0, 3.5]);
        assert_eq!(data.get("t_min"), Some(&[1.0, 2.0, 3.0][..]));
        assert!(data.get("t_max").is_none());
        assert!(data.dates().is_none());
    }

    #[test]
    fn test_missing_discharge_rejected() {
        let df = df! { "prec" => &[1.0, 2.0] }.unwrap();
        assert!(matches!(
            ForcingData::from_dataframe(&df),
            Err(AcmeError::DataLoading(_))
        ));
    }

    #[test]
    fn test_non_numeric_column_rejected() {
        let df = df! {
            "prec" => &["a", "b"],
            "discharge" => &[1.0, 2.0],
        }
        .unwrap();
        assert!(ForcingData::from_dataframe(&df).is_err());
    }

    #[test]
    fn test_unequal_lengths_rejected() {
        assert!(ForcingData::new(vec![1.0, 2.0], vec![1.0]).is_err());
        let data = ForcingData::new(vec![1.0], vec![1.0]).unwrap();
        assert!(data.with_series(ForcingSeries::TMean, vec![]).is_err());
    }

    #[test]
    fn test_require_reports_missing_series() {
        let data = ForcingData::new(vec![1.0], vec![1.0])
            .unwrap()
            .with_series(ForcingSeries::TMean, vec![10.0])
            .unwrap();
        assert!(data.require(&["t_mean"]).is_ok());
        assert!(data.require(&["t_min", "t_max"]).is_err());
    }

    #[test]
    fn test_window_without_years_uses_whole_record() {
        let data = ForcingData::new(vec![0.0; 4], vec![0.0; 4]).unwrap();
        let window = data.window(&PeriodConfig::default()).unwrap();
        assert_eq!(window.calibration, 0..4);
        assert!(window.validation.is_empty());
    }

    #[test]
    fn test_window_splits_calibration_and_validation_years() {
        let data = dated(&[2000, 2000, 2001, 2002, 2003, 2004]);
        let period = PeriodConfig {
            start_year: Some(2001),
            end_year: Some(2002),
            validation_time_span: 2,
        };
        let window = data.window(&period).unwrap();
        assert_eq!(window.calibration, 2..4);
        assert_eq!(window.validation, 4..6);
    }

    #[test]
    fn test_window_requires_dates_for_years() {
        let data = ForcingData::new(vec![0.0; 2], vec![0.0; 2]).unwrap();
        let period = PeriodConfig {
            start_year: Some(2000),
            ..PeriodConfig::default()
        };
        assert!(data.window(&period).is_err());
    }

    #[test]
    fn test_window_outside_record_rejected() {
        let data = dated(&[2000, 2001]);
        let period = PeriodConfig {
            start_year: Some(1990),
            end_year: Some(1995),
            validation_time_span: 0,
        };
        assert!(data.window(&period).is_err());
    }

    #[test]
    fn test_csv_loader_parses_dates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,prec,discharge,t_mean").unwrap();
        writeln!(file, "2001-01-01,1.5,0.4,3.0").unwrap();
        writeln!(file, "2001-01-02,0.0,0.3,4.0").unwrap();
        file.flush().unwrap();

        let data = CsvForcingLoader::load(file.path()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(
            data.dates().unwrap()[1],
            NaiveDate::from_ymd_opt(2001, 1, 2).unwrap()
        );
        assert_eq!(data.series(ForcingSeries::TMean), Some(&[3.0, 4.0][..]));
    }
}
