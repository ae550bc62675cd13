/// Value span of one indicator across the proposals under comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ValueRange {
    pub(crate) min: f64,
    pub(crate) max: f64,
}

impl ValueRange {
    pub(crate) fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |range, value| match range {
            None => Some(Self {
                min: value,
                max: value,
            }),
            Some(Self { min, max }) => Some(Self {
                min: min.min(value),
                max: max.max(value),
            }),
        })
    }

    /// Most favourable raw value honouring the indicator's direction.
    pub(crate) fn best(self, lower_is_better: bool) -> f64 {
        if lower_is_better {
            self.min
        } else {
            self.max
        }
    }

    /// Min-max placement on a 0-100 scale. A degenerate range scores 100 for everyone.
    pub(crate) fn place(self, value: f64, lower_is_better: bool) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 {
            return 100.0;
        }
        let offset = if lower_is_better {
            self.max - value
        } else {
            value - self.min
        };
        offset / span * 100.0
    }
}
