use axum::response::Html;

/// Index page; `{TRANSCRIPT_HTML}` is replaced with the current transcript render
const INDEX_TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Duet - Two-Agent Assessment Demo</title>
  <style>
    * { box-sizing: border-box; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      margin: 0 auto;
      max-width: 1100px;
      padding: 24px;
      color: #1e293b;
      background: #ffffff;
    }
    h1 { font-size: 26px; margin: 0 0 16px; }
    h2 { font-size: 18px; margin: 24px 0 10px; }
    .duet-chat {
      min-height: 400px;
      max-height: 500px;
      overflow-y: auto;
      border: 1px solid #ddd;
      border-radius: 10px;
      padding: 15px;
      background-color: #f9f9f9;
      scroll-behavior: smooth;
      word-break: break-word;
      overflow-wrap: anywhere;
    }
    .duet-chat .duet-turn:last-child { margin-bottom: 0; }
    .input-row { display: flex; gap: 10px; margin-top: 12px; }
    .input-row textarea {
      flex: 1;
      min-height: 56px;
      padding: 10px 12px;
      border-radius: 8px;
      border: 1px solid #ccc;
      font: inherit;
      resize: vertical;
    }
    .input-actions { display: flex; flex-direction: column; gap: 6px; min-width: 96px; }
    button {
      padding: 8px 14px;
      border-radius: 8px;
      border: 1px solid #ccc;
      background: #f1f5f9;
      font: inherit;
      cursor: pointer;
    }
    button.primary { background: #2563eb; border-color: #2563eb; color: #fff; }
    button:disabled { opacity: 0.5; cursor: not-allowed; }
    .upload-row { display: flex; justify-content: space-between; gap: 10px; }
    .upload-button {
      flex: 1;
      display: flex;
      flex-direction: column;
      gap: 8px;
      padding: 12px;
      border: 1px dashed #ccc;
      border-radius: 10px;
    }
    .upload-button label { font-weight: 600; font-size: 14px; }
    .footer { text-align: center; margin-top: 20px; color: #666; }
  </style>
</head>
<body>
  <h1>Duet: connecting minds, caring for wellbeing</h1>

  <h2>Agent conversation</h2>
  <div class="duet-chat" id="chat">{TRANSCRIPT_HTML}</div>

  <div class="input-row">
    <textarea id="message" placeholder="Type a message here..."></textarea>
    <div class="input-actions">
      <button id="send" class="primary">Send</button>
      <button id="demo">Demo playback</button>
    </div>
  </div>

  <h2>Data upload</h2>
  <div class="upload-row">
    <div class="upload-button">
      <label for="video-file">Video</label>
      <input type="file" id="video-file" accept="video/*">
      <button class="primary" data-kind="video" data-input="video-file">Upload video</button>
    </div>
    <div class="upload-button">
      <label for="fnirs-file">fNIRS data</label>
      <input type="file" id="fnirs-file">
      <button class="primary" data-kind="fnirs" data-input="fnirs-file">Upload fNIRS data</button>
    </div>
    <div class="upload-button">
      <label for="eeg-file">EEG data</label>
      <input type="file" id="eeg-file">
      <button class="primary" data-kind="eeg" data-input="eeg-file">Upload EEG data</button>
    </div>
  </div>

  <div class="footer"><hr>Duet demo</div>

  <script>
    const chat = document.getElementById('chat');
    const input = document.getElementById('message');
    const sendBtn = document.getElementById('send');
    const demoBtn = document.getElementById('demo');
    let replay = null;

    function show(html) {
      chat.innerHTML = html;
      chat.scrollTop = chat.scrollHeight;
    }

    async function post(url, body) {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body)
      });
      const data = await res.json();
      if (!data.success) throw new Error(data.error || ('HTTP ' + res.status));
      return data.html;
    }

    async function send() {
      const text = input.value;
      input.value = '';
      try {
        show(await post('/chat', { text }));
      } catch (e) {
        alert('Message failed: ' + e.message);
      }
    }

    sendBtn.addEventListener('click', send);
    input.addEventListener('keydown', (e) => {
      if (e.key === 'Enter' && !e.shiftKey) { e.preventDefault(); send(); }
    });

    demoBtn.addEventListener('click', () => {
      if (replay) replay.close();
      demoBtn.disabled = true;
      replay = new EventSource('/demo/stream');
      const finish = () => { replay.close(); replay = null; demoBtn.disabled = false; };
      replay.addEventListener('snapshot', (e) => show(e.data));
      replay.addEventListener('done', finish);
      replay.addEventListener('error', (e) => {
        if (e.data) show(e.data);
        finish();
      });
    });

    function readBase64(file) {
      return new Promise((resolve, reject) => {
        const reader = new FileReader();
        reader.onload = () => resolve(String(reader.result).split(',')[1] || '');
        reader.onerror = () => reject(reader.error);
        reader.readAsDataURL(file);
      });
    }

    document.querySelectorAll('button[data-kind]').forEach((btn) => {
      btn.addEventListener('click', async () => {
        const file = document.getElementById(btn.dataset.input).files[0];
        btn.disabled = true;
        try {
          const body = file
            ? { filename: file.name, content: await readBase64(file), base64_encoded: true }
            : { filename: '', content: '' };
          show(await post('/upload/' + btn.dataset.kind, body));
        } catch (e) {
          alert('Upload failed: ' + e.message);
        } finally {
          btn.disabled = false;
        }
      });
    });
  </script>
</body>
</html>"##;

/// Render the index page around a transcript fragment
pub fn index_page(transcript_html: &str) -> Html<String> {
    Html(INDEX_TEMPLATE.replace("{TRANSCRIPT_HTML}", transcript_html))
}
