/// Day-over-day percent change of `close`, times 100. The first day is 0.
pub fn daily_returns(close: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(close.len());
    for (i, c) in close.iter().enumerate() {
        let r = match i.checked_sub(1).map(|j| close[j]) {
            Some(prev) if prev != 0.0 => (c / prev - 1.0) * 100.0,
            _ => 0.0,
        };
        out.push(r);
    }
    out
}

/// Pearson correlation; `None` when either side has zero variance or lengths differ.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        self.values[i][j]
    }
}

pub fn correlation_matrix(columns: &[(&str, Vec<f64>)]) -> CorrelationMatrix {
    let names = columns.iter().map(|(n, _)| n.to_string()).collect();
    let values = columns
        .iter()
        .map(|(_, xs)| columns.iter().map(|(_, ys)| pearson(xs, ys)).collect())
        .collect();
    CorrelationMatrix { names, values }
}
