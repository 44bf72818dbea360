use super::measurement::PerformanceMetrics;
use super::plot::plot_prediction;
use crate::data::{saver, Frame};
use crate::module::Module;
use crate::processing::SHIFTED_TARGET;
use crate::run::RunContext;
use anyhow::{bail, Result};
use ndarray::{concatenate, s, Array1, Array2, Axis};
use tracing::{debug, info};

/// Eigenvalues below this fraction of the largest are treated as zero
const RANK_TOLERANCE: f64 = 1e-10;

const MAX_JACOBI_SWEEPS: usize = 100;

/// Fitted linear predictor `intercept + x . coefficients`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub coefficients: Array1<f64>,
}

impl LinearFit {
    /// Least squares with an intercept; `alpha > 0` adds an L2 penalty on
    /// the coefficients but never on the intercept
    ///
    /// Rank-deficient predictors get the minimum-norm solution.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> Result<Self> {
        if x.nrows() == 0 || x.nrows() != y.len() {
            bail!("cannot fit {} rows against {} targets", x.nrows(), y.len());
        }

        let ones = Array2::<f64>::ones((x.nrows(), 1));
        let design = concatenate(Axis(1), &[ones.view(), x.view()])?;

        // Normal equations: (X'X + alpha D) beta = X'y, D excluding the intercept
        let xt = design.t();
        let mut xtx = xt.dot(&design);
        let xty = xt.dot(y);
        for i in 1..xtx.nrows() {
            xtx[[i, i]] += alpha;
        }

        let beta = solve_normal_equations(&xtx, &xty);
        Ok(Self {
            intercept: beta[0],
            coefficients: beta.slice(s![1..]).to_owned(),
        })
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coefficients.len() {
            bail!(
                "model has {} coefficients but got {} predictors",
                self.coefficients.len(),
                x.ncols()
            );
        }
        Ok(x.dot(&self.coefficients) + self.intercept)
    }
}

/// Cholesky when the system is positive definite, pseudo-inverse otherwise
fn solve_normal_equations(xtx: &Array2<f64>, xty: &Array1<f64>) -> Array1<f64> {
    match cholesky_solve(xtx, xty) {
        Some(beta) => beta,
        None => {
            debug!("Normal equations are rank deficient, using the minimum-norm solution");
            pseudoinverse_solve(xtx, xty)
        }
    }
}

fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let scale = a.diag().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= RANK_TOLERANCE * scale {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L z = b, then L' x = z
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }
    Some(x)
}

/// `A⁺ b` for symmetric positive semi-definite `A`
fn pseudoinverse_solve(a: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let (eigenvalues, eigenvectors) = symmetric_eigen(a);
    let largest = eigenvalues.iter().fold(0.0_f64, |m, v| m.max(v.abs()));

    let mut projected = eigenvectors.t().dot(b);
    for (value, lambda) in projected.iter_mut().zip(eigenvalues.iter()) {
        if *lambda > RANK_TOLERANCE * largest {
            *value /= lambda;
        } else {
            *value = 0.0;
        }
    }
    eigenvectors.dot(&projected)
}

/// Cyclic Jacobi rotations: `A = V diag(lambda) V'`
fn symmetric_eigen(a: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut a = a.clone();
    let mut v = Array2::<f64>::eye(n);
    let norm = a.iter().map(|x| x * x).sum::<f64>().sqrt();

    for _ in 0..MAX_JACOBI_SWEEPS {
        let off_diagonal: f64 = a
            .indexed_iter()
            .filter(|((i, j), _)| i != j)
            .map(|(_, x)| x * x)
            .sum::<f64>()
            .sqrt();
        if off_diagonal <= f64::EPSILON * norm {
            break;
        }

        for p in 0..n {
            for q in p + 1..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let (akp, akq) = (a[[k, p]], a[[k, q]]);
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[[p, k]], a[[q, k]]);
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}

/// Predictor matrix and target of one shifted modelling file
#[derive(Debug)]
struct Design {
    predictors: Vec<String>,
    x: Array2<f64>,
    y: Array1<f64>,
}

impl Design {
    /// Every column except the target is a predictor, in file order
    fn from_frame(frame: &Frame) -> Result<Self> {
        let predictors: Vec<String> = frame
            .column_names()
            .into_iter()
            .filter(|name| *name != SHIFTED_TARGET)
            .map(str::to_string)
            .collect();
        if predictors.is_empty() {
            bail!("no predictor columns besides {}", SHIFTED_TARGET);
        }
        Self::with_predictors(frame, &predictors)
    }

    /// Predictors taken by name in the given order; any other column is an error
    fn with_predictors(frame: &Frame, predictors: &[String]) -> Result<Self> {
        let extra: Vec<&str> = frame
            .column_names()
            .into_iter()
            .filter(|name| *name != SHIFTED_TARGET && !predictors.iter().any(|p| p == name))
            .collect();
        if !extra.is_empty() {
            bail!("unexpected predictor columns {:?}, the model uses {:?}", extra, predictors);
        }

        let columns = predictors
            .iter()
            .map(|name| frame.require(name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            predictors: predictors.to_vec(),
            x: Array2::from_shape_fn((frame.len(), columns.len()), |(i, j)| columns[j][i]),
            y: Array1::from(frame.require(SHIFTED_TARGET)?.to_vec()),
        })
    }
}

/// Ordinary and ridge regression of the shifted target on every other column
pub struct LinearModel {
    context: RunContext,
}

impl LinearModel {
    pub const NAME: &'static str = "LinearModel";

    pub fn new(context: &RunContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    fn read(&self, name: &str) -> Result<Frame> {
        let frame = Frame::read_csv(&saver::data_path(&self.context, name, "modelling"))?;
        let frame = frame.drop_incomplete_rows();
        if frame.is_empty() {
            bail!("{} has no complete rows", name);
        }
        Ok(frame)
    }

    fn evaluate(&self, label: &str, alpha: f64) -> Result<()> {
        info!("Get training and testing data");
        let train = Design::from_frame(&self.read("training_shifted")?)?;
        let test = Design::with_predictors(&self.read("testing_shifted")?, &train.predictors)?;

        info!("Fitting the {} model", label.replace('_', " "));
        let fit = LinearFit::fit(&train.x, &train.y, alpha)?;
        debug!(
            "intercept {}, coefficients {} for {:?}",
            fit.intercept, fit.coefficients, train.predictors
        );

        let pred_train = fit.predict(&train.x)?;
        let pred_test = fit.predict(&test.x)?;

        info!("Calculating performance metrics");
        let train_metrics = PerformanceMetrics::compute(&train.y, &pred_train)?;
        let test_metrics = PerformanceMetrics::compute(&test.y, &pred_test)?;
        info!("{}: In-Sample Error: [{}]", label, train_metrics);
        info!("{}: Out-of-Sample Error: [{}]", label, test_metrics);

        saver::save_items(
            &self.context,
            &train_metrics.items(),
            &format!("{label}_train_results"),
            "modelling",
        )?;
        saver::save_items(
            &self.context,
            &test_metrics.items(),
            &format!("{label}_test_results"),
            "modelling",
        )?;

        info!("Plotting prediction and results");
        plot_prediction(
            &saver::plot_path(&self.context, &format!("{label}_prediction_out_of_sample"), None),
            &test.y,
            &pred_test,
        )?;
        plot_prediction(
            &saver::plot_path(&self.context, &format!("{label}_prediction_in_sample"), None),
            &train.y,
            &pred_train,
        )?;
        Ok(())
    }
}

impl Module for LinearModel {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&mut self) -> Result<()> {
        debug!("Starting Linear Regression Model Building...");
        self.evaluate("linear_regression", 0.0)?;
        debug!("Linear regression model finished successfully");

        let alpha = self.context.settings().model.linear.ridge_alpha;
        debug!("Starting Ridge Regression Model Building with alpha {}...", alpha);
        self.evaluate("ridge_regression", alpha)?;
        debug!("Ridge regression model finished successfully");
        Ok(())
    }
}
