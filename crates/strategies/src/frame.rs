// In crates/strategies/src/frame.rs

use core_types::{Kline, Signal};
use num_traits::ToPrimitive;
use polars::prelude::{DataFrame as PolarsFrame, DataType, NamedFrom, Series};
use rust_decimal::Decimal;

use crate::{Error, Result};

/// The four signal columns a strategy writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalColumn {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
}

impl SignalColumn {
    pub const ALL: [SignalColumn; 4] = [
        SignalColumn::EnterLong,
        SignalColumn::EnterShort,
        SignalColumn::ExitLong,
        SignalColumn::ExitShort,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SignalColumn::EnterLong => "enter_long",
            SignalColumn::EnterShort => "enter_short",
            SignalColumn::ExitLong => "exit_long",
            SignalColumn::ExitShort => "exit_short",
        }
    }
}

/// A candle series plus the columns strategies derive from it.
///
/// Backed by a polars frame: `open_time` is an `Int64` series, price and
/// indicator columns are nullable `Float64` series holding null where a value
/// is undefined (warm-up rows, unmatched merges), and signal columns are
/// `Boolean` series that only exist once a populate callback has written them.
#[derive(Debug, Clone)]
pub struct DataFrame {
    frame: PolarsFrame,
}

const OPEN_TIME: &str = "open_time";

impl DataFrame {
    /// Builds a frame with `open`, `high`, `low`, `close` and `volume` columns.
    pub fn from_klines(klines: &[Kline]) -> Result<Self> {
        for (index, pair) in klines.windows(2).enumerate() {
            if pair[1].open_time <= pair[0].open_time {
                return Err(core_types::Error::NonMonotonicSeries {
                    index: index + 1,
                    open_time: pair[1].open_time,
                }
                .into());
            }
        }

        let price = |column: &'static str, get: fn(&Kline) -> Decimal| -> Result<Series> {
            let values = klines
                .iter()
                .map(|k| {
                    let value = get(k);
                    value.to_f64().map(Some).ok_or_else(|| Error::UnrepresentablePrice {
                        column,
                        value: value.to_string(),
                    })
                })
                .collect::<Result<Vec<Option<f64>>>>()?;
            Ok(Series::new(column, values))
        };

        let open_time: Vec<i64> = klines.iter().map(|k| k.open_time).collect();
        let frame = PolarsFrame::new(vec![
            Series::new(OPEN_TIME, open_time),
            price("open", |k| k.open)?,
            price("high", |k| k.high)?,
            price("low", |k| k.low)?,
            price("close", |k| k.close)?,
            price("volume", |k| k.volume)?,
        ])
        .map_err(|e| Error::Frame(e.to_string()))?;

        Ok(Self { frame })
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn open_time(&self) -> Vec<i64> {
        self.frame
            .column(OPEN_TIME)
            .and_then(|series| series.i64())
            .map(|values| values.into_iter().flatten().collect())
            .unwrap_or_default()
    }

    /// Whether a float column named `name` exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.frame
            .column(name)
            .is_ok_and(|series| series.dtype() == &DataType::Float64)
    }

    /// Names of the float columns, in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.frame
            .get_columns()
            .iter()
            .filter(|series| series.dtype() == &DataType::Float64)
            .map(|series| series.name())
    }

    pub fn column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let values = self
            .frame
            .column(name)
            .and_then(|series| series.f64())
            .map_err(|_| Error::MissingColumn(name.to_string()))?;
        Ok(values.into_iter().collect())
    }

    /// Adds or replaces a float column.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        self.replace(&name, Series::new(name.as_str(), values))
    }

    pub fn signal(&self, column: SignalColumn) -> Result<Vec<bool>> {
        let values = self
            .frame
            .column(column.name())
            .and_then(|series| series.bool())
            .map_err(|_| Error::MissingColumn(column.name().to_string()))?;
        Ok(values.into_iter().map(|flag| flag.unwrap_or(false)).collect())
    }

    pub fn set_signal(&mut self, column: SignalColumn, values: Vec<bool>) -> Result<()> {
        self.replace(column.name(), Series::new(column.name(), values))
    }

    /// Writes an all-false signal column.
    pub fn clear_signal(&mut self, column: SignalColumn) -> Result<()> {
        self.set_signal(column, vec![false; self.len()])
    }

    /// Value of `column` on the last row.
    pub fn last_value(&self, column: &str) -> Result<f64> {
        let values = self.column(column)?;
        let row = values.len().checked_sub(1).ok_or(Error::InsufficientData {
            required: 1,
            available: 0,
        })?;
        values[row].ok_or_else(|| Error::UndefinedValue { column: column.to_string(), row })
    }

    /// Defined values of `column` over the last `count` rows.
    pub fn tail(&self, column: &str, count: usize) -> Result<Vec<f64>> {
        let values = self.column(column)?;
        if values.len() < count {
            return Err(Error::InsufficientData { required: count, available: values.len() });
        }
        let start = values.len() - count;
        values[start..]
            .iter()
            .enumerate()
            .map(|(offset, v)| {
                v.ok_or_else(|| Error::UndefinedValue {
                    column: column.to_string(),
                    row: start + offset,
                })
            })
            .collect()
    }

    /// Maps the flags on the last row to a single decision.
    ///
    /// Entries take precedence over exits. A row asking for both a long and a
    /// short entry is ambiguous and yields `Hold`.
    pub fn latest_signal(&self) -> Signal {
        let Some(row) = self.len().checked_sub(1) else {
            return Signal::Hold;
        };
        let flag = |column: SignalColumn| {
            self.signal(column).is_ok_and(|values| values[row])
        };

        let enter_long = flag(SignalColumn::EnterLong);
        let enter_short = flag(SignalColumn::EnterShort);
        if enter_long && enter_short {
            tracing::warn!(row, "Both long and short entries are set on the latest candle; ignoring them.");
            return Signal::Hold;
        }
        if enter_long {
            Signal::EnterLong
        } else if enter_short {
            Signal::EnterShort
        } else if flag(SignalColumn::ExitLong) {
            Signal::ExitLong
        } else if flag(SignalColumn::ExitShort) {
            Signal::ExitShort
        } else {
            Signal::Hold
        }
    }

    fn replace(&mut self, name: &str, series: Series) -> Result<()> {
        if name == OPEN_TIME {
            return Err(Error::Frame(format!("'{OPEN_TIME}' is the row index and cannot be replaced")));
        }
        // polars broadcasts unit-length series, so lengths are checked up front.
        let actual = series.len();
        let expected = self.len();
        if actual != expected {
            return Err(Error::LengthMismatch { column: name.to_string(), expected, actual });
        }
        self.frame.with_column(series).map_err(|_| Error::LengthMismatch {
            column: name.to_string(),
            expected,
            actual,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kline(open_time: i64, close: Decimal) -> Kline {
        Kline {
            open_time,
            open: close,
            high: close + dec!(1),
            low: close - dec!(1),
            close,
            volume: dec!(10),
        }
    }

    #[test]
    fn builds_price_columns() {
        let frame = DataFrame::from_klines(&[kline(0, dec!(10)), kline(1, dec!(11.5))]).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.column("close").unwrap(), &[Some(10.0), Some(11.5)]);
        assert_eq!(frame.column("high").unwrap(), &[Some(11.0), Some(12.5)]);
        assert_eq!(frame.open_time(), &[0, 1]);
    }

    #[test]
    fn rejects_unordered_candles() {
        let err = DataFrame::from_klines(&[kline(5, dec!(1)), kline(5, dec!(2))]).unwrap_err();
        assert_eq!(
            err,
            Error::Core(core_types::Error::NonMonotonicSeries { index: 1, open_time: 5 })
        );
    }

    #[test]
    fn missing_and_misaligned_columns() {
        let mut frame = DataFrame::from_klines(&[kline(0, dec!(10))]).unwrap();
        assert_eq!(frame.column("high_20"), Err(Error::MissingColumn("high_20".into())));
        assert_eq!(
            frame.set_column("x", vec![None, None]),
            Err(Error::LengthMismatch { column: "x".into(), expected: 1, actual: 2 })
        );
        assert!(frame.signal(SignalColumn::EnterLong).is_err());
    }

    #[test]
    fn last_value_and_tail() {
        let mut frame =
            DataFrame::from_klines(&[kline(0, dec!(1)), kline(1, dec!(2)), kline(2, dec!(3))]).unwrap();
        assert_eq!(frame.last_value("close"), Ok(3.0));
        assert_eq!(frame.tail("close", 2), Ok(vec![2.0, 3.0]));
        assert_eq!(
            frame.tail("close", 4),
            Err(Error::InsufficientData { required: 4, available: 3 })
        );

        frame.set_column("low_3", vec![None, None, None]).unwrap();
        assert_eq!(
            frame.last_value("low_3"),
            Err(Error::UndefinedValue { column: "low_3".into(), row: 2 })
        );
    }

    #[test]
    fn latest_signal_reads_last_row() {
        let mut frame = DataFrame::from_klines(&[kline(0, dec!(1)), kline(1, dec!(2))]).unwrap();
        assert_eq!(frame.latest_signal(), Signal::Hold);

        frame.set_signal(SignalColumn::EnterLong, vec![true, false]).unwrap();
        assert_eq!(frame.latest_signal(), Signal::Hold);

        frame.set_signal(SignalColumn::ExitLong, vec![false, true]).unwrap();
        assert_eq!(frame.latest_signal(), Signal::ExitLong);

        frame.set_signal(SignalColumn::EnterLong, vec![false, true]).unwrap();
        assert_eq!(frame.latest_signal(), Signal::EnterLong);

        frame.set_signal(SignalColumn::EnterShort, vec![false, true]).unwrap();
        assert_eq!(frame.latest_signal(), Signal::Hold);
    }

    #[test]
    fn columns_keep_nulls_and_replace_in_place() {
        let mut frame =
            DataFrame::from_klines(&[kline(0, dec!(1)), kline(1, dec!(2)), kline(2, dec!(3))]).unwrap();
        frame.set_column("low_3", vec![None, None, Some(0.0)]).unwrap();
        frame.set_column("low_3", vec![None, Some(1.0), Some(2.0)]).unwrap();

        assert_eq!(frame.column("low_3").unwrap(), &[None, Some(1.0), Some(2.0)]);
        let names: Vec<&str> = frame.column_names().collect();
        assert_eq!(names, ["open", "high", "low", "close", "volume", "low_3"]);

        frame.clear_signal(SignalColumn::ExitLong).unwrap();
        assert_eq!(frame.signal(SignalColumn::ExitLong).unwrap(), &[false, false, false]);
        // Signal columns are not float columns.
        assert!(!frame.has_column("exit_long"));
        assert!(frame.column("exit_long").is_err());
    }

    #[test]
    fn unit_columns_and_the_index_are_not_writable() {
        let mut frame = DataFrame::from_klines(&[kline(0, dec!(1)), kline(1, dec!(2))]).unwrap();
        assert_eq!(
            frame.set_signal(SignalColumn::EnterLong, vec![true]),
            Err(Error::LengthMismatch { column: "enter_long".into(), expected: 2, actual: 1 })
        );
        assert!(matches!(
            frame.set_column("open_time", vec![Some(0.0), Some(1.0)]),
            Err(Error::Frame(_))
        ));
        assert_eq!(frame.open_time(), &[0, 1]);
    }
}
