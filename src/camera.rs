// Camera bridge for the gallery.
//
// On Android this calls into MainActivity over JNI and polls for the captured
// file. Other platforms have no camera and report `CaptureError::Unavailable`.

use crate::filesystem::file_uri;
use async_trait::async_trait;
use photo_gallery::{CaptureError, CaptureOptions, CaptureProvider, CapturedPhoto};
use std::path::Path;
use std::time::Duration;

const DEFAULT_MAIN_ACTIVITY_CLASS: &str = "dev/dioxus/main/MainActivity";

#[cfg(target_os = "android")]
use jni::objects::{JClass, JObject, JString, JValue};

/// Configuration for the Android camera bridge
#[derive(Debug, Clone)]
pub struct AndroidCameraConfig {
    /// Fully qualified class name in slash format (e.g., "com/example/myapp/MainActivity")
    pub main_activity_class: String,
    /// How long to wait for the user to take a photo
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for AndroidCameraConfig {
    fn default() -> Self {
        Self {
            main_activity_class: DEFAULT_MAIN_ACTIVITY_CLASS.to_string(),
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Device camera
#[derive(Debug, Clone)]
pub struct NativeCamera {
    config: AndroidCameraConfig,
}

impl NativeCamera {
    pub fn new(config: AndroidCameraConfig) -> Self {
        Self { config }
    }

    /// Builds the capture result for a file the camera app wrote.
    ///
    /// The web path is the plain `file://` URI so that `HttpFetcher` can read
    /// it back when the web environment is forced on a device. The hybrid
    /// display path is derived from the stored copy, not from this value.
    pub(crate) fn captured(path: String) -> CapturedPhoto {
        let web_path = file_uri(Path::new(&path));
        CapturedPhoto::new(Some(path), Some(web_path))
    }
}

#[async_trait]
impl CaptureProvider for NativeCamera {
    async fn get_photo(&self, options: &CaptureOptions) -> Result<CapturedPhoto, CaptureError> {
        log::debug!(
            "Requesting photo (quality {}, source {:?})",
            options.quality,
            options.source
        );
        let config = self.config.clone();
        let path = tokio::task::spawn_blocking(move || launch_camera(&config))
            .await
            .map_err(|e| CaptureError::Other(format!("Task join error: {}", e)))??;
        Ok(Self::captured(path))
    }
}

#[cfg(target_os = "android")]
fn jni_error(context: &str) -> impl Fn(jni::errors::Error) -> CaptureError + '_ {
    move |e| CaptureError::Other(format!("{} failed: {}", context, e))
}

#[cfg(target_os = "android")]
fn get_activity_instance<'a>(
    env: &mut jni::JNIEnv<'a>,
    config: &AndroidCameraConfig,
) -> Result<(JObject<'a>, JClass<'a>), CaptureError> {
    // Load through the application class loader; FindClass on a native
    // thread only sees system classes.
    let at_cls = env
        .find_class("android/app/ActivityThread")
        .map_err(jni_error("find ActivityThread"))?;
    let at = env
        .call_static_method(&at_cls, "currentActivityThread", "()Landroid/app/ActivityThread;", &[])
        .and_then(|v| v.l())
        .map_err(jni_error("currentActivityThread"))?;
    let app = env
        .call_method(&at, "getApplication", "()Landroid/app/Application;", &[])
        .and_then(|v| v.l())
        .map_err(jni_error("getApplication"))?;
    let loader = env
        .call_method(&app, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .and_then(|v| v.l())
        .map_err(jni_error("getClassLoader"))?;

    let name: JString = env
        .new_string(config.main_activity_class.replace('/', "."))
        .map_err(jni_error("new_string"))?;
    let cls = env
        .call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&JObject::from(name))],
        )
        .and_then(|v| v.l())
        .map(JClass::from)
        .map_err(jni_error("loadClass"))?;

    let signature = format!("()L{};", config.main_activity_class);
    let instance = env
        .call_static_method(&cls, "getInstance", &signature, &[])
        .and_then(|v| v.l())
        .map_err(jni_error("getInstance"))?;

    if instance.is_null() {
        return Err(CaptureError::Unavailable(
            "MainActivity instance is null - Activity not initialized?".to_string(),
        ));
    }
    Ok((instance, cls))
}

#[cfg(target_os = "android")]
fn poll_string(env: &mut jni::JNIEnv, cls: &JClass, method: &str) -> Option<String> {
    let obj = env
        .call_static_method(cls, method, "()Ljava/lang/String;", &[])
        .ok()?
        .l()
        .ok()?;
    if obj.is_null() {
        return None;
    }
    env.get_string((&obj).into()).ok().map(Into::into)
}

/// Maps the activity's error string onto the capture taxonomy
#[cfg_attr(not(target_os = "android"), allow(dead_code))]
fn classify_camera_error(message: String) -> CaptureError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission") {
        CaptureError::PermissionDenied(message)
    } else if lower.contains("cancel") {
        CaptureError::Cancelled(message)
    } else {
        CaptureError::Other(message)
    }
}

#[cfg(target_os = "android")]
fn launch_camera(config: &AndroidCameraConfig) -> Result<String, CaptureError> {
    let vm_ptr = ndk_context::android_context().vm() as *mut *const jni::sys::JNIInvokeInterface_;
    let vm = unsafe { jni::JavaVM::from_raw(vm_ptr) }.map_err(jni_error("JavaVM"))?;
    let mut env = vm.attach_current_thread().map_err(jni_error("JNI attach"))?;

    let (activity, main_cls) = get_activity_instance(&mut env, config)?;

    env.call_static_method(&main_cls, "clearLastError", "()V", &[])
        .map_err(jni_error("clearLastError"))?;
    env.call_method(&activity, "launchCamera", "()V", &[])
        .map_err(jni_error("launchCamera"))?;

    let polls = (config.timeout.as_millis() / config.poll_interval.as_millis().max(1)).max(1);
    for _ in 0..polls {
        std::thread::sleep(config.poll_interval);

        if let Some(path) = poll_string(&mut env, &main_cls, "getLastPhotoPath") {
            return Ok(path);
        }
        if let Some(err) = poll_string(&mut env, &main_cls, "getLastError") {
            return Err(classify_camera_error(err));
        }
    }

    Err(CaptureError::Timeout("Camera timeout - no photo taken".to_string()))
}

#[cfg(not(target_os = "android"))]
fn launch_camera(_config: &AndroidCameraConfig) -> Result<String, CaptureError> {
    Err(CaptureError::Unavailable(
        "Camera not available on this platform".to_string(),
    ))
}
