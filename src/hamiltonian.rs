// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use num_complex::Complex64;

/// State vector in the computational basis.
pub type Ket = DVector<Complex64>;

/// Largest number of qubits accepted, bounded by the dense 2^N x 2^N storage.
pub static MAX_QUBITS: u32 = 12;

/// Tolerance used to decide whether an operator is Hermitian.
pub static HERMITIAN_TOLERANCE: f64 = 1e-10;

static MAX_EIGEN_ITERATIONS: usize = 10000;

/// Dense operator on a Hilbert space with tensor-product structure.
///
/// The `dims` keep track of the dimensions of the subsystems, e.g.,
/// `[2, 2, 2]` for three qubits: their product is always equal to the
/// number of rows (and columns) of the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    matrix: DMatrix<Complex64>,
    dims: Vec<usize>,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dims {:?}{}", self.dims, self.matrix)
    }
}

impl Operator {
    pub fn new(matrix: DMatrix<Complex64>, dims: Vec<usize>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            matrix.is_square(),
            "operator matrix is not square: {}x{}",
            matrix.nrows(),
            matrix.ncols()
        );
        anyhow::ensure!(!dims.is_empty(), "no subsystem dimensions");
        anyhow::ensure!(
            dims.iter().all(|d| *d > 0),
            "vanishing subsystem dimension in {:?}",
            dims
        );
        let expected = dims.iter().product::<usize>();
        anyhow::ensure!(
            expected == matrix.nrows(),
            "subsystem dimensions {:?} do not match the matrix size {}",
            dims,
            matrix.nrows()
        );
        Ok(Self { matrix, dims })
    }

    /// Identity on a single subsystem of dimension `n`.
    pub fn qeye(n: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(n > 0, "vanishing identity dimension");
        Ok(Self {
            matrix: DMatrix::identity(n, n),
            dims: vec![n],
        })
    }

    /// Projector `|ket><ket|` with the given subsystem dimensions.
    pub fn projector(ket: &Ket, dims: Vec<usize>) -> anyhow::Result<Self> {
        Self::new(ket * ket.adjoint(), dims)
    }

    pub fn matrix(&self) -> &DMatrix<Complex64> {
        &self.matrix
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Dimension of the full Hilbert space.
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Tensor (Kronecker) product, `self` being the leftmost factor.
    pub fn tensor(&self, rhs: &Operator) -> Operator {
        let mut dims = self.dims.clone();
        dims.extend_from_slice(&rhs.dims);
        Operator {
            matrix: self.matrix.kronecker(&rhs.matrix),
            dims,
        }
    }

    /// Conjugate transpose.
    pub fn dag(&self) -> Operator {
        Operator {
            matrix: self.matrix.adjoint(),
            dims: self.dims.clone(),
        }
    }

    pub fn is_hermitian(&self, tol: f64) -> bool {
        let n = self.dim();
        for i in 0..n {
            for j in 0..=i {
                if (self.matrix[(i, j)] - self.matrix[(j, i)].conj()).norm() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Return `a * lhs + b * rhs`. The operators must have the same dimensions.
    pub fn linear_combination(
        a: f64,
        lhs: &Operator,
        b: f64,
        rhs: &Operator,
    ) -> anyhow::Result<Operator> {
        anyhow::ensure!(
            lhs.dims == rhs.dims,
            "mismatching dimensions: {:?} vs. {:?}",
            lhs.dims,
            rhs.dims
        );
        Ok(Operator {
            matrix: &lhs.matrix * Complex64::from(a) + &rhs.matrix * Complex64::from(b),
            dims: lhs.dims.clone(),
        })
    }

    /// Return `self - rhs`. The operators must have the same dimensions.
    pub fn sub(&self, rhs: &Operator) -> anyhow::Result<Operator> {
        Operator::linear_combination(1.0, self, -1.0, rhs)
    }

    /// Eigenvalues in ascending order.
    pub fn eigenenergies(&self) -> anyhow::Result<Vec<f64>> {
        Ok(self.eigenstates()?.0)
    }

    /// Eigenvalues in ascending order, with the corresponding unit-norm
    /// eigenvectors.
    pub fn eigenstates(&self) -> anyhow::Result<(Vec<f64>, Vec<Ket>)> {
        anyhow::ensure!(
            self.is_hermitian(HERMITIAN_TOLERANCE),
            "cannot eigendecompose a non-Hermitian operator"
        );
        let eigen = hermitian_eigen(self.matrix.clone())?;
        let mut indexed: Vec<(usize, f64)> =
            eigen.eigenvalues.iter().cloned().enumerate().collect();
        indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

        let energies = indexed.iter().map(|(_, e)| *e).collect();
        let states = indexed
            .iter()
            .map(|(i, _)| eigen.eigenvectors.column(*i).clone_owned())
            .collect();
        Ok((energies, states))
    }
}

/// Eigendecomposition of a Hermitian matrix, of which only the lower
/// triangle is read.
pub(crate) fn hermitian_eigen(
    matrix: DMatrix<Complex64>,
) -> anyhow::Result<SymmetricEigen<Complex64, nalgebra::Dyn>> {
    let n = matrix.nrows();
    match SymmetricEigen::try_new(matrix, f64::EPSILON, MAX_EIGEN_ITERATIONS) {
        Some(eigen) => Ok(eigen),
        None => anyhow::bail!(
            "eigendecomposition of a {}x{} matrix did not converge",
            n,
            n
        ),
    }
}

/// Return the computational basis state `|index>` of a `dim`-dimensional space.
pub fn basis(dim: usize, index: usize) -> anyhow::Result<Ket> {
    anyhow::ensure!(
        index < dim,
        "basis index {} out of range for dimension {}",
        index,
        dim
    );
    let mut ket = Ket::zeros(dim);
    ket[index] = Complex64::from(1.0);
    Ok(ket)
}

fn valid_num_qubits(num_qubits: u32) -> anyhow::Result<()> {
    anyhow::ensure!(num_qubits >= 1, "vanishing number of qubits");
    anyhow::ensure!(
        num_qubits <= MAX_QUBITS,
        "too many qubits ({}), at most {} are supported",
        num_qubits,
        MAX_QUBITS
    );
    Ok(())
}

/// Return the identity of the Hilbert space of `num_qubits` qubits, built as
/// the tensor product of single-qubit identities so that the subsystem
/// structure is retained.
pub fn build_identity(num_qubits: u32) -> anyhow::Result<Operator> {
    valid_num_qubits(num_qubits)?;
    let qubit = Operator::qeye(2)?;
    let mut identity = qubit.clone();
    for _ in 1..num_qubits {
        identity = identity.tensor(&qubit);
    }
    Ok(identity)
}

/// Return the equal-weight superposition of all the computational basis
/// states of `num_qubits` qubits.
pub fn uniform_superposition(num_qubits: u32) -> anyhow::Result<Ket> {
    valid_num_qubits(num_qubits)?;
    let dim = 1_usize << num_qubits;
    let amplitude = (1.0 / dim as f64).sqrt();
    Ok(Ket::from_element(dim, Complex64::from(amplitude)))
}

/// Build the initial and final Hamiltonians of the Grover search problem.
///
/// Parameters:
/// - `marked`: the index of the marked state, in [0, 2^N)
/// - `num_qubits`: the number of qubits N
///
/// Return `(Hi, Hf)` where `Hi = I - |psi><psi|`, with `psi` the uniform
/// superposition, and `Hf = I - |m><m|`. The states are taken from the
/// eigenbasis of the identity, i.e., the computational basis in index order.
pub fn grover_hamiltonians(marked: usize, num_qubits: u32) -> anyhow::Result<(Operator, Operator)> {
    let identity = build_identity(num_qubits)?;
    let dim = identity.dim();
    anyhow::ensure!(
        marked < dim,
        "marked state {} out of range with {} qubits",
        marked,
        num_qubits
    );

    let psi = uniform_superposition(num_qubits)?;
    let ket_m = basis(dim, marked)?;

    let initial = identity.sub(&Operator::projector(&psi, identity.dims().to_vec())?)?;
    let target = identity.sub(&Operator::projector(&ket_m, identity.dims().to_vec())?)?;
    log::debug!(
        "built Grover Hamiltonians with {} qubits, marked state {}",
        num_qubits,
        marked
    );
    Ok((initial, target))
}
