//! Windows WebView2 implementation.
//!
//! The WebView2 controller lives inside a host window of our own. The host
//! window starts as a hidden popup so the engine can initialize before the
//! plugin host hands us a parent; embedding turns it into a child window.
//!
//! A 60 Hz `WM_TIMER` on the host window drives [`SurfaceEvents::on_tick`].

use std::ffi::c_void;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use ::windows::core::{w, HSTRING, PCWSTR, PWSTR};
use ::windows::Win32::Foundation::{E_POINTER, HWND, LPARAM, LRESULT, RECT, WPARAM};
use ::windows::Win32::System::Com::{
    CoInitializeEx, CoTaskMemFree, CoUninitialize, COINIT_APARTMENTTHREADED,
};
use ::windows::Win32::System::LibraryLoader::GetModuleHandleW;
use ::windows::Win32::UI::Shell::SHCreateMemStream;
use ::windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetWindowLongPtrW, KillTimer,
    RegisterClassW, SetParent, SetTimer, SetWindowLongPtrW, SetWindowPos, ShowWindow,
    GWLP_USERDATA, GWL_STYLE, HWND_TOP, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOOWNERZORDER,
    SWP_NOZORDER, SW_HIDE, SW_SHOWNA, WINDOW_EX_STYLE, WM_TIMER, WNDCLASSW, WS_CHILD,
    WS_CLIPCHILDREN, WS_POPUP,
};
use lantern_core::{ScriptContext, Size, BOOTSTRAP_SCRIPT};
use webview2_com::Microsoft::Web::WebView2::Win32::{
    CreateCoreWebView2EnvironmentWithOptions, ICoreWebView2, ICoreWebView2Controller,
    ICoreWebView2Environment, ICoreWebView2EnvironmentOptions, ICoreWebView2WebResourceResponse,
    COREWEBVIEW2_WEB_RESOURCE_CONTEXT_ALL,
};
use webview2_com::{
    AddScriptToExecuteOnDocumentCreatedCompletedHandler, CoreWebView2EnvironmentOptions,
    CreateCoreWebView2ControllerCompletedHandler, CreateCoreWebView2EnvironmentCompletedHandler,
    ExecuteScriptCompletedHandler, NavigationCompletedEventHandler, WebMessageReceivedEventHandler,
    WebResourceRequestedEventHandler,
};

use crate::error::{Result, WebViewError};
use crate::resources::{request_path, ResourceProvider, VIRTUAL_ORIGIN_FILTER};
use crate::surface::{
    NativeHandle, ParentWindow, RenderSurface, SurfaceEvents, SurfaceFactory, SurfaceOptions,
};

const SYNC_TIMER_ID: usize = 1;
const SYNC_INTERVAL_MS: u32 = 16;

/// Creates WebView2 surfaces. Embeds into `HWND` parents.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsSurfaceFactory;

impl SurfaceFactory for WindowsSurfaceFactory {
    fn supports_platform(&self, platform_type: &str) -> bool {
        platform_type == "HWND"
    }

    fn create(
        &self,
        options: SurfaceOptions,
        events: Arc<dyn SurfaceEvents>,
    ) -> Result<Box<dyn RenderSurface>> {
        let surface = WindowsSurface::new(options, events)?;
        Ok(Box::new(surface))
    }
}

/// Script channel over a WebView2 instance.
struct WebViewScript<'a>(&'a ICoreWebView2);

impl ScriptContext for WebViewScript<'_> {
    fn evaluate_script(&self, script: &str) {
        let script = HSTRING::from(script);
        let completed = ExecuteScriptCompletedHandler::create(Box::new(|_, _| Ok(())));
        // SAFETY: the webview is alive for the borrow and we are on its UI thread.
        let result = unsafe { self.0.ExecuteScript(PCWSTR(script.as_ptr()), &completed) };
        if let Err(err) = result {
            log::warn!("ExecuteScript failed: {err}");
        }
    }
}

/// State reachable from the host window procedure.
struct TickContext {
    webview: ICoreWebView2,
    events: Arc<dyn SurfaceEvents>,
}

/// A WebView2 surface.
pub struct WindowsSurface {
    hwnd: HWND,
    controller: ICoreWebView2Controller,
    webview: ICoreWebView2,
    tick: *mut TickContext,
    size: Size,
    embedded: bool,
    destroyed: bool,
    com_initialized: bool,
}

impl WindowsSurface {
    fn new(options: SurfaceOptions, events: Arc<dyn SurfaceEvents>) -> Result<Self> {
        // SAFETY: initializing COM on the calling (UI) thread. Balanced in destroy().
        let com_initialized = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }.is_ok();

        let hwnd = match create_host_window(options.size) {
            Ok(hwnd) => hwnd,
            Err(err) => {
                if com_initialized {
                    // SAFETY: balances the successful CoInitializeEx above.
                    unsafe { CoUninitialize() };
                }
                return Err(err);
            }
        };

        match attach_webview(hwnd, &options, &events) {
            Ok((controller, webview)) => {
                let tick = Box::into_raw(Box::new(TickContext {
                    webview: webview.clone(),
                    events,
                }));
                // SAFETY: hwnd is our live host window; the pointer is cleared
                // and freed in destroy() before the window goes away.
                unsafe {
                    SetWindowLongPtrW(hwnd, GWLP_USERDATA, tick as isize);
                    SetTimer(Some(hwnd), SYNC_TIMER_ID, SYNC_INTERVAL_MS, None);
                }
                Ok(Self {
                    hwnd,
                    controller,
                    webview,
                    tick,
                    size: options.size,
                    embedded: false,
                    destroyed: false,
                    com_initialized,
                })
            }
            Err(err) => {
                // SAFETY: hwnd was created above and is not referenced elsewhere.
                unsafe {
                    let _ = DestroyWindow(hwnd);
                    if com_initialized {
                        CoUninitialize();
                    }
                }
                Err(err)
            }
        }
    }
}

impl ScriptContext for WindowsSurface {
    fn evaluate_script(&self, script: &str) {
        if !self.destroyed {
            WebViewScript(&self.webview).evaluate_script(script);
        }
    }
}

impl RenderSurface for WindowsSurface {
    fn embed(&mut self, parent: ParentWindow) -> Result<()> {
        if self.destroyed {
            return Err(WebViewError::NotAttached);
        }
        if self.embedded {
            return Err(WebViewError::AlreadyAttached);
        }

        // SAFETY: self.hwnd is our live host window and parent is a window
        // handle supplied by the plugin host.
        unsafe {
            let style = GetWindowLongPtrW(self.hwnd, GWL_STYLE);
            let style = (style & !(WS_POPUP.0 as isize)) | WS_CHILD.0 as isize;
            let _ = ShowWindow(self.hwnd, SW_HIDE);
            SetWindowLongPtrW(self.hwnd, GWL_STYLE, style);
            SetParent(self.hwnd, Some(HWND(parent.0)))
                .map_err(|e| WebViewError::CreationFailed(format!("SetParent: {e}")))?;
            let _ = ShowWindow(self.hwnd, SW_SHOWNA);
        }

        self.embedded = true;
        Ok(())
    }

    fn resize(&mut self, size: Size) -> Result<()> {
        if self.destroyed {
            return Err(WebViewError::NotAttached);
        }

        // SAFETY: self.hwnd is our live host window.
        unsafe {
            SetWindowPos(
                self.hwnd,
                Some(HWND_TOP),
                0,
                0,
                size.width as i32,
                size.height as i32,
                SWP_NOACTIVATE | SWP_NOMOVE | SWP_NOOWNERZORDER | SWP_NOZORDER,
            )
        }
        .map_err(|e| WebViewError::Geometry(format!("SetWindowPos: {e}")))?;

        // SAFETY: the controller is alive until destroy().
        unsafe { self.controller.SetBounds(bounds(size)) }
            .map_err(|e| WebViewError::Geometry(format!("SetBounds: {e}")))?;

        self.size = size;
        Ok(())
    }

    fn size(&self) -> Size {
        self.size
    }

    fn native_handle(&self) -> NativeHandle {
        NativeHandle(self.hwnd.0)
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        // SAFETY: the timer and user data belong to our host window; the tick
        // context was created with Box::into_raw in new() and is freed once.
        unsafe {
            let _ = KillTimer(Some(self.hwnd), SYNC_TIMER_ID);
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            drop(Box::from_raw(self.tick));
            let _ = self.controller.Close();
            let _ = DestroyWindow(self.hwnd);
            if self.com_initialized {
                CoUninitialize();
            }
        }
        self.tick = std::ptr::null_mut();
    }
}

impl Drop for WindowsSurface {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn bounds(size: Size) -> RECT {
    RECT {
        left: 0,
        top: 0,
        right: size.width as i32,
        bottom: size.height as i32,
    }
}

fn creation_failed(context: &str, err: impl std::fmt::Debug) -> WebViewError {
    WebViewError::CreationFailed(format!("{context}: {err:?}"))
}

unsafe extern "system" fn host_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_TIMER && wparam.0 == SYNC_TIMER_ID {
        // SAFETY: user data is either null or the TickContext installed in new().
        let context = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const TickContext;
        if !context.is_null() {
            // SAFETY: non-null and alive until destroy() clears it.
            let context = unsafe { &*context };
            context.events.on_tick(&WebViewScript(&context.webview));
        }
        return LRESULT(0);
    }
    // SAFETY: forwarding unhandled messages with the original arguments.
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

fn create_host_window(size: Size) -> Result<HWND> {
    // Class names are per process; tie ours to this module's window procedure
    // so two plugin binaries never share a class.
    let class_name = HSTRING::from(format!(
        "LanternWebViewHost{:x}",
        host_window_proc as usize
    ));

    // SAFETY: registering a window class and creating a window with valid,
    // null-terminated strings that outlive the calls.
    unsafe {
        let instance = GetModuleHandleW(PCWSTR::null())
            .map_err(|e| creation_failed("GetModuleHandleW", e))?;
        let class = WNDCLASSW {
            lpfnWndProc: Some(host_window_proc),
            hInstance: instance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };
        // Zero when already registered by an earlier editor.
        RegisterClassW(&class);

        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            PCWSTR(class_name.as_ptr()),
            w!("Lantern"),
            WS_POPUP | WS_CLIPCHILDREN,
            0,
            0,
            size.width as i32,
            size.height as i32,
            None,
            None,
            Some(instance.into()),
            None,
        )
        .map_err(|e| creation_failed("CreateWindowExW", e))
    }
}

fn user_data_folder() -> Option<PathBuf> {
    std::env::var_os("LOCALAPPDATA").map(|dir| PathBuf::from(dir).join("Lantern").join("WebView2"))
}

fn create_environment() -> Result<ICoreWebView2Environment> {
    let data_folder = user_data_folder()
        .map(|path| HSTRING::from(path.as_os_str()))
        .unwrap_or_default();
    let options: ICoreWebView2EnvironmentOptions = CoreWebView2EnvironmentOptions::default().into();

    let (tx, rx) = mpsc::channel();
    CreateCoreWebView2EnvironmentCompletedHandler::wait_for_async_operation(
        Box::new(move |handler| {
            let folder = if data_folder.is_empty() {
                PCWSTR::null()
            } else {
                PCWSTR(data_folder.as_ptr())
            };
            // SAFETY: all string arguments outlive the call.
            unsafe {
                CreateCoreWebView2EnvironmentWithOptions(PCWSTR::null(), folder, &options, &handler)
                    .map_err(webview2_com::Error::WindowsError)
            }
        }),
        Box::new(move |error_code, environment| {
            error_code?;
            let _ = tx.send(environment.ok_or_else(|| ::windows::core::Error::from(E_POINTER)));
            Ok(())
        }),
    )
    .map_err(|e| creation_failed("CreateCoreWebView2Environment", e))?;

    rx.recv()
        .map_err(|e| creation_failed("environment channel", e))?
        .map_err(|e| creation_failed("environment", e))
}

fn create_controller(
    environment: &ICoreWebView2Environment,
    hwnd: HWND,
) -> Result<ICoreWebView2Controller> {
    let (tx, rx) = mpsc::channel();
    let environment = environment.clone();
    CreateCoreWebView2ControllerCompletedHandler::wait_for_async_operation(
        Box::new(move |handler| {
            // SAFETY: hwnd is our live host window.
            unsafe {
                environment
                    .CreateCoreWebView2Controller(hwnd, &handler)
                    .map_err(webview2_com::Error::WindowsError)
            }
        }),
        Box::new(move |error_code, controller| {
            error_code?;
            let _ = tx.send(controller.ok_or_else(|| ::windows::core::Error::from(E_POINTER)));
            Ok(())
        }),
    )
    .map_err(|e| creation_failed("CreateCoreWebView2Controller", e))?;

    rx.recv()
        .map_err(|e| creation_failed("controller channel", e))?
        .map_err(|e| creation_failed("controller", e))
}

fn attach_webview(
    hwnd: HWND,
    options: &SurfaceOptions,
    events: &Arc<dyn SurfaceEvents>,
) -> Result<(ICoreWebView2Controller, ICoreWebView2)> {
    let environment = create_environment()?;
    let controller = create_controller(&environment, hwnd)?;

    let configured = configure(&environment, &controller, options, events);
    match configured {
        Ok(webview) => Ok((controller, webview)),
        Err(err) => {
            // SAFETY: the controller was created above and is not shared.
            let _ = unsafe { controller.Close() };
            Err(err)
        }
    }
}

fn configure(
    environment: &ICoreWebView2Environment,
    controller: &ICoreWebView2Controller,
    options: &SurfaceOptions,
    events: &Arc<dyn SurfaceEvents>,
) -> Result<ICoreWebView2> {
    // SAFETY: every call below targets live COM objects created on this
    // thread, with string arguments that outlive the call.
    unsafe {
        controller
            .SetBounds(bounds(options.size))
            .map_err(|e| creation_failed("SetBounds", e))?;
        controller
            .SetIsVisible(true)
            .map_err(|e| creation_failed("SetIsVisible", e))?;

        let webview = controller
            .CoreWebView2()
            .map_err(|e| creation_failed("CoreWebView2", e))?;

        let settings = webview
            .Settings()
            .map_err(|e| creation_failed("Settings", e))?;
        settings
            .SetAreDevToolsEnabled(options.dev_tools)
            .map_err(|e| creation_failed("SetAreDevToolsEnabled", e))?;
        settings
            .SetAreDefaultContextMenusEnabled(options.dev_tools)
            .map_err(|e| creation_failed("SetAreDefaultContextMenusEnabled", e))?;

        inject_bootstrap(&webview)?;
        register_message_handler(&webview, events)?;
        register_load_handler(&webview, events)?;
        if options.resources.intercepts_requests() {
            register_resource_handler(environment, &webview, &options.resources)?;
        }

        let url = HSTRING::from(options.resources.entry_url());
        webview
            .Navigate(PCWSTR(url.as_ptr()))
            .map_err(|e| creation_failed("Navigate", e))?;

        Ok(webview)
    }
}

fn inject_bootstrap(webview: &ICoreWebView2) -> Result<()> {
    let script = HSTRING::from(BOOTSTRAP_SCRIPT);
    let target = webview.clone();
    AddScriptToExecuteOnDocumentCreatedCompletedHandler::wait_for_async_operation(
        Box::new(move |handler| {
            // SAFETY: the script string outlives the call.
            unsafe {
                target
                    .AddScriptToExecuteOnDocumentCreated(PCWSTR(script.as_ptr()), &handler)
                    .map_err(webview2_com::Error::WindowsError)
            }
        }),
        Box::new(|error_code, _id| error_code),
    )
    .map_err(|e| creation_failed("AddScriptToExecuteOnDocumentCreated", e))
}

fn register_message_handler(webview: &ICoreWebView2, events: &Arc<dyn SurfaceEvents>) -> Result<()> {
    let events = Arc::clone(events);
    let handler = WebMessageReceivedEventHandler::create(Box::new(move |sender, args| {
        let (Some(sender), Some(args)) = (sender, args) else {
            return Ok(());
        };
        let mut message = PWSTR::null();
        // SAFETY: args is a live event argument; the string is freed by take_pwstr.
        let message = unsafe {
            args.TryGetWebMessageAsString(&mut message)?;
            take_pwstr(message)
        };
        events.on_message(&WebViewScript(&sender), &message);
        Ok(())
    }));

    let mut token = 0;
    // SAFETY: registering a handler on a live webview.
    unsafe { webview.add_WebMessageReceived(&handler, &mut token) }
        .map_err(|e| creation_failed("add_WebMessageReceived", e))
}

fn register_load_handler(webview: &ICoreWebView2, events: &Arc<dyn SurfaceEvents>) -> Result<()> {
    let events = Arc::clone(events);
    let handler = NavigationCompletedEventHandler::create(Box::new(move |sender, _args| {
        if let Some(sender) = sender {
            events.on_loaded(&WebViewScript(&sender));
        }
        Ok(())
    }));

    let mut token = 0;
    // SAFETY: registering a handler on a live webview.
    unsafe { webview.add_NavigationCompleted(&handler, &mut token) }
        .map_err(|e| creation_failed("add_NavigationCompleted", e))
}

fn register_resource_handler(
    environment: &ICoreWebView2Environment,
    webview: &ICoreWebView2,
    resources: &Arc<dyn ResourceProvider>,
) -> Result<()> {
    let filter = HSTRING::from(VIRTUAL_ORIGIN_FILTER);
    // SAFETY: the filter string outlives the call.
    unsafe {
        webview.AddWebResourceRequestedFilter(
            PCWSTR(filter.as_ptr()),
            COREWEBVIEW2_WEB_RESOURCE_CONTEXT_ALL,
        )
    }
    .map_err(|e| creation_failed("AddWebResourceRequestedFilter", e))?;

    let environment = environment.clone();
    let resources = Arc::clone(resources);
    let handler = WebResourceRequestedEventHandler::create(Box::new(move |_sender, args| {
        let Some(args) = args else {
            return Ok(());
        };
        // SAFETY: args and the request are live for the duration of the event.
        unsafe {
            let request = args.Request()?;
            let mut uri = PWSTR::null();
            request.Uri(&mut uri)?;
            let uri = take_pwstr(uri);
            let response = respond(&environment, resources.as_ref(), &uri)?;
            args.SetResponse(&response)
        }
    }));

    let mut token = 0;
    // SAFETY: registering a handler on a live webview.
    unsafe { webview.add_WebResourceRequested(&handler, &mut token) }
        .map_err(|e| creation_failed("add_WebResourceRequested", e))
}

/// Build the response for one intercepted request. Misses get a 404.
fn respond(
    environment: &ICoreWebView2Environment,
    resources: &dyn ResourceProvider,
    uri: &str,
) -> ::windows::core::Result<ICoreWebView2WebResourceResponse> {
    let path = request_path(uri);
    let resource = path.as_deref().and_then(|path| resources.resolve(path));

    let (status, reason, body, content_type) = match resource {
        Some(resource) => (200, "OK", resource.data, resource.mime_type),
        None => {
            log::warn!("UI resource not found: {uri}");
            (404, "Not Found", &b"Not Found"[..], "text/plain")
        }
    };

    let reason = HSTRING::from(reason);
    let headers = HSTRING::from(format!("Content-Type: {content_type}"));
    // SAFETY: the body slice is copied into the stream; strings outlive the call.
    unsafe {
        let stream = SHCreateMemStream(Some(body));
        environment.CreateWebResourceResponse(
            stream.as_ref(),
            status,
            PCWSTR(reason.as_ptr()),
            PCWSTR(headers.as_ptr()),
        )
    }
}

/// Copy a COM-allocated wide string and free it.
///
/// # Safety
///
/// `pwstr` must be null or a null-terminated string allocated with `CoTaskMemAlloc`.
unsafe fn take_pwstr(pwstr: PWSTR) -> String {
    if pwstr.is_null() {
        return String::new();
    }
    // SAFETY: non-null and null-terminated per the contract above.
    let text = String::from_utf16_lossy(unsafe { pwstr.as_wide() });
    // SAFETY: allocated with CoTaskMemAlloc and not used afterwards.
    unsafe { CoTaskMemFree(Some(pwstr.0 as *const c_void)) };
    text
}
