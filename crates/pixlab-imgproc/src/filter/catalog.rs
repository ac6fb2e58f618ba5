use pixlab_image::ImageError;

use super::Kernel;

/// Name given to kernels created with [`KernelCatalog::push_custom`].
pub const CUSTOM_KERNEL_NAME: &str = "Custom";

/// A kernel together with the name it is listed under.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedKernel {
    /// Display name of the kernel.
    pub name: String,
    /// The kernel weights.
    pub kernel: Kernel,
}

/// An ordered, caller-owned collection of named convolution kernels.
///
/// The catalog starts either empty ([`KernelCatalog::new`]) or with the laboratory
/// presets ([`KernelCatalog::with_presets`]). Entries can be added, looked up by name or
/// position, and replaced in place when the user edits a kernel.
///
/// # Example
///
/// ```
/// use pixlab_imgproc::filter::KernelCatalog;
///
/// let catalog = KernelCatalog::with_presets().unwrap();
/// let sobel = catalog.get("Sobel Horizontal").unwrap();
///
/// assert_eq!(sobel.side(), 3);
/// assert_eq!(sobel.sum(), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KernelCatalog {
    entries: Vec<NamedKernel>,
}

impl KernelCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the preset kernels, in display order.
    pub fn with_presets() -> Result<Self, ImageError> {
        let mut catalog = Self::new();

        catalog.push("No filter", Kernel::identity());
        catalog.push(
            "Gaussian 3x3",
            Kernel::from_rows(&[[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]])?,
        );
        catalog.push(
            "Gaussian 5x5",
            Kernel::from_rows(&[
                [2.0, 7.0, 12.0, 7.0, 2.0],
                [7.0, 31.0, 52.0, 31.0, 7.0],
                [12.0, 52.0, 127.0, 52.0, 12.0],
                [7.0, 31.0, 52.0, 31.0, 7.0],
                [2.0, 7.0, 12.0, 7.0, 2.0],
            ])?,
        );
        catalog.push(
            "Laplacian 3x3",
            Kernel::from_rows(&[[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]])?,
        );
        catalog.push(
            "Laplacian 5x5",
            Kernel::from_rows(&[
                [0.0, 0.0, -1.0, 0.0, 0.0],
                [0.0, -1.0, -2.0, -1.0, 0.0],
                [-1.0, -2.0, 16.0, -2.0, -1.0],
                [0.0, -1.0, -2.0, -1.0, 0.0],
                [0.0, 0.0, -1.0, 0.0, 0.0],
            ])?,
        );
        catalog.push(
            "Prewitt Horizontal",
            Kernel::from_rows(&[[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]])?,
        );
        catalog.push(
            "Prewitt Vertical",
            Kernel::from_rows(&[[-1.0, -1.0, -1.0], [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]])?,
        );
        catalog.push(
            "Sobel Horizontal",
            Kernel::from_rows(&[[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]])?,
        );
        catalog.push(
            "Sobel Vertical",
            Kernel::from_rows(&[[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]])?,
        );
        catalog.push(
            "Laplace High Pass Filter (3x3)",
            Kernel::from_rows(&[[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]])?,
        );
        catalog.push(
            "Laplace High Pass Filter (5x5)",
            Kernel::from_rows(&[
                [-1.0, -3.0, -4.0, -3.0, -1.0],
                [-3.0, 0.0, 6.0, 0.0, -3.0],
                [-4.0, 6.0, 20.0, 6.0, -4.0],
                [-3.0, 0.0, 6.0, 0.0, -3.0],
                [-1.0, -3.0, -4.0, -3.0, -1.0],
            ])?,
        );
        catalog.push(
            "Hipass",
            Kernel::from_rows(&[[-1.0, -1.0, -1.0], [-1.0, 9.0, -1.0], [-1.0, -1.0, -1.0]])?,
        );
        catalog.push(
            "Edge detection",
            Kernel::from_rows(&[[1.0, 1.0, 1.0], [1.0, -2.0, 1.0], [-1.0, -1.0, -1.0]])?,
        );
        catalog.push(
            "Sharpen",
            Kernel::from_rows(&[[-1.0, -1.0, -1.0], [-1.0, 16.0, -1.0], [-1.0, -1.0, -1.0]])?,
        );
        catalog.push(
            "Softening",
            Kernel::from_rows(&[[2.0, 2.0, 2.0], [2.0, 0.0, 2.0], [2.0, 2.0, 2.0]])?,
        );

        Ok(catalog)
    }

    /// Append a kernel and return its position.
    pub fn push(&mut self, name: impl Into<String>, kernel: Kernel) -> usize {
        self.entries.push(NamedKernel {
            name: name.into(),
            kernel,
        });
        self.entries.len() - 1
    }

    /// Append an all-zero kernel of the given side, listed as [`CUSTOM_KERNEL_NAME`].
    ///
    /// # Errors
    ///
    /// Returns an error if the side is zero or even, or so large that `side * side`
    /// overflows.
    pub fn push_custom(&mut self, side: usize) -> Result<usize, ImageError> {
        let kernel = Kernel::zeros(side)?;
        Ok(self.push(CUSTOM_KERNEL_NAME, kernel))
    }

    /// Replace the kernel at `index`, returning the previous one.
    ///
    /// Returns `None` and leaves the catalog untouched when `index` is out of range.
    pub fn replace(&mut self, index: usize, kernel: Kernel) -> Option<Kernel> {
        self.entries
            .get_mut(index)
            .map(|entry| std::mem::replace(&mut entry.kernel, kernel))
    }

    /// The first kernel listed under `name`.
    pub fn get(&self, name: &str) -> Option<&Kernel> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.kernel)
    }

    /// The entry at `index`.
    pub fn get_index(&self, index: usize) -> Option<&NamedKernel> {
        self.entries.get(index)
    }

    /// Iterate over the entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedKernel> {
        self.entries.iter()
    }

    /// Names of the entries in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
