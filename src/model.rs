use crate::error::Error;

use std::fmt;
use std::str::FromStr;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

#[cfg(any(feature = "realesrgan", feature = "realcugan"))]
use image::RgbImage;
#[cfg(feature = "realcugan")]
use realcugan_rs::{RealCugan, Options as RealCuganOptions, OptionsModel as RealCuganOptionsModel};
#[cfg(feature = "realesrgan")]
use realesrgan_rs::{RealEsrgan, Options as RealEsrganOptions, OptionsModel as RealEsrganOptionsModel};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scale {
    #[default]
    X2,
    X4,
}

impl Scale {
    pub fn factor(&self) -> u32 {
        match self {
            Scale::X2 => 2,
            Scale::X4 => 4,
        }
    }
}

impl FromStr for Scale {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "2" => Ok(Scale::X2),
            "4" => Ok(Scale::X4),
            other => Err(Error::InvalidArgument(format!("scale must be 2 or 4, got {}", other))),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.factor())
    }
}

/// Maps one decoded frame to a larger one. Implementations are shared
/// between upscale workers.
pub trait Upscaler: Sync + Send {
    fn upscale(&self, image: &DynamicImage) -> Result<DynamicImage, Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    RealEsrgan,
    RealCugan(Scale),
    Lanczos(Scale),
}

impl Model {
    pub const NAMES: &'static [&'static str] = &["realesrgan", "realcugan", "lanczos"];

    pub fn default_name() -> &'static str {
        if cfg!(feature = "realesrgan") {
            "realesrgan"
        } else {
            "lanczos"
        }
    }

    pub fn select(name: Option<&str>, scale: Scale) -> Result<Self, Error> {
        match name.unwrap_or(Self::default_name()) {
            "realesrgan" if cfg!(feature = "realesrgan") => Ok(Model::RealEsrgan),
            "realcugan" if cfg!(feature = "realcugan") => Ok(Model::RealCugan(scale)),
            "lanczos" => Ok(Model::Lanczos(scale)),
            other => Err(Error::UnsupportedModel(other.to_string())),
        }
    }

    /// Factor the model produces on its own, before any correction to the
    /// requested scale.
    pub fn native_scale(&self) -> u32 {
        match self {
            Model::RealEsrgan => 4,
            Model::RealCugan(scale) | Model::Lanczos(scale) => scale.factor(),
        }
    }

    /// Builds the backend once for the whole run on the given device.
    pub fn create(&self, scale: Scale, device: u32) -> Result<Backend, Error> {
        let upscaler: Box<dyn Upscaler> = match self {
            Model::RealEsrgan => self.create_realesrgan(device)?,
            Model::RealCugan(native) => self.create_realcugan(*native, device)?,
            Model::Lanczos(native) => Box::new(Lanczos { factor: native.factor() }),
        };
        log::info!("Initialized {} (native {}x) on device {}", self, self.native_scale(), device);
        Ok(Backend::new(*self, scale, upscaler))
    }

    #[cfg(feature = "realesrgan")]
    fn create_realesrgan(&self, device: u32) -> Result<Box<dyn Upscaler>, Error> {
        self.check_device(device)?;
        let options = RealEsrganOptions::default().model(RealEsrganOptionsModel::RealESRGANPlusx4);
        RealEsrgan::new(options)
            .map(|model| Box::new(model) as Box<dyn Upscaler>)
            .map_err(|e| self.initialization_error(device, e))
    }

    #[cfg(not(feature = "realesrgan"))]
    fn create_realesrgan(&self, _device: u32) -> Result<Box<dyn Upscaler>, Error> {
        Err(Error::UnsupportedModel(format!("{} (built without the realesrgan feature)", self)))
    }

    #[cfg(feature = "realcugan")]
    fn create_realcugan(&self, native: Scale, device: u32) -> Result<Box<dyn Upscaler>, Error> {
        let model = match native {
            Scale::X2 => RealCuganOptionsModel::Se2xConservative,
            Scale::X4 => RealCuganOptionsModel::Se4xConservative,
        };
        self.check_device(device)?;
        let options = RealCuganOptions::default().model(model);
        RealCugan::new(options)
            .map(|model| Box::new(Cugan { model, factor: native.factor() }) as Box<dyn Upscaler>)
            .map_err(|e| self.initialization_error(device, e))
    }

    #[cfg(not(feature = "realcugan"))]
    fn create_realcugan(&self, _native: Scale, _device: u32) -> Result<Box<dyn Upscaler>, Error> {
        Err(Error::UnsupportedModel(format!("{} (built without the realcugan feature)", self)))
    }

    /// The ncnn bindings always run on the first GPU.
    #[cfg(any(feature = "realesrgan", feature = "realcugan"))]
    fn check_device(&self, device: u32) -> Result<(), Error> {
        match device {
            0 => Ok(()),
            _ => Err(Error::ModelInitialization {
                model: self.to_string(),
                device,
                reason: "only device 0 is available to the ncnn backends".to_string(),
            }),
        }
    }

    #[cfg(any(feature = "realesrgan", feature = "realcugan"))]
    fn initialization_error(&self, device: u32, reason: impl fmt::Debug) -> Error {
        Error::ModelInitialization { model: self.to_string(), device, reason: format!("{:?}", reason) }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::RealEsrgan => write!(f, "realesrgan-x4"),
            Model::RealCugan(scale) => write!(f, "realcugan-x{}", scale),
            Model::Lanczos(scale) => write!(f, "lanczos-x{}", scale),
        }
    }
}

/// The inference backend of one run: a constructed upscaler plus the
/// resolution the run asked for.
pub struct Backend {
    model: Model,
    scale: Scale,
    upscaler: Box<dyn Upscaler>,
}

impl Backend {
    pub fn new(model: Model, scale: Scale, upscaler: Box<dyn Upscaler>) -> Self {
        Self { model, scale, upscaler }
    }

    pub fn model(&self) -> Model {
        self.model
    }

    /// Output is always exactly `scale` times the input, whatever factor the
    /// model itself produces.
    pub fn process(&self, image: &DynamicImage) -> Result<DynamicImage, Error> {
        let (width, height) = image.dimensions();
        let factor = self.scale.factor();
        let (target_width, target_height) = (width * factor, height * factor);

        let upscaled = self.upscaler.upscale(image)?;
        if upscaled.dimensions() == (target_width, target_height) {
            Ok(upscaled)
        } else {
            Ok(upscaled.resize_exact(target_width, target_height, FilterType::Lanczos3))
        }
    }
}

struct Lanczos {
    factor: u32,
}

impl Upscaler for Lanczos {
    fn upscale(&self, image: &DynamicImage) -> Result<DynamicImage, Error> {
        let (width, height) = image.dimensions();
        Ok(image.resize_exact(width * self.factor, height * self.factor, FilterType::Lanczos3))
    }
}

#[cfg(any(feature = "realesrgan", feature = "realcugan"))]
fn process_rgb<E: fmt::Display>(
    name: &str,
    image: &DynamicImage,
    factor: u32,
    process: impl FnOnce(&[u8], usize, usize) -> Result<Vec<u8>, E>,
) -> Result<DynamicImage, Error> {
    let input = image.to_rgb8();
    let (width, height) = input.dimensions();
    let output = process(input.as_raw(), width as usize, height as usize)
        .map_err(|e| Error::UpscaleError(e.to_string()))?;
    RgbImage::from_raw(width * factor, height * factor, output)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| Error::InvalidImageBuffer(name.to_string()))
}

#[cfg(feature = "realesrgan")]
impl Upscaler for RealEsrgan {
    fn upscale(&self, image: &DynamicImage) -> Result<DynamicImage, Error> {
        process_rgb("realesrgan", image, 4, |input, width, height| self.process(input, width, height))
    }
}

#[cfg(feature = "realcugan")]
struct Cugan {
    model: RealCugan,
    factor: u32,
}

#[cfg(feature = "realcugan")]
impl Upscaler for Cugan {
    fn upscale(&self, image: &DynamicImage) -> Result<DynamicImage, Error> {
        process_rgb("realcugan", image, self.factor, |input, width, height| self.model.process(input, width, height))
    }
}
